//! `-v`/`ANIMEDEN_LOG_LEVEL`: how much the server logs.
//!
//! Repeating `-v` raises the level one step per flag. The environment
//! variable takes either a level name or the same step count.

use clap::{builder::ValueParser, Arg, ArgAction, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in step order; step 0 keeps the subscriber default (errors).
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Parse a level name (any case) or step count into a step count.
///
/// # Errors
/// Returns a message naming the accepted values.
pub fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim();
    if let Ok(steps) = value.parse::<u8>() {
        return if usize::from(steps) < LEVEL_NAMES.len() {
            Ok(steps)
        } else {
            Err(format!("log level must be 0-{}", LEVEL_NAMES.len() - 1))
        };
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value))
        .and_then(|steps| u8::try_from(steps).ok())
        .ok_or_else(|| format!("unknown log level {value:?}, expected one of {LEVEL_NAMES:?}"))
}

/// Tracing level for a step count; `None` leaves the default in place.
#[must_use]
pub const fn level_for(steps: u8) -> Option<Level> {
    match steps {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Raise log verbosity: -v warn, -vv info, -vvv debug, -vvvv trace")
            .env("ANIMEDEN_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_verbosity)),
    )
}
