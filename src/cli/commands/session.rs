use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Arg, ArgMatches, Command};

pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_SESSION_IDLE_SECONDS: &str = "session-idle-seconds";
pub const ARG_SESSION_ROTATION_GRACE_SECONDS: &str = "session-rotation-grace-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("ANIMEDEN_SESSION_COOKIE_SECURE")
                .default_value("true")
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_SESSION_IDLE_SECONDS)
                .long(ARG_SESSION_IDLE_SECONDS)
                .help("Seconds of inactivity before a session is discarded")
                .env("ANIMEDEN_SESSION_IDLE_SECONDS")
                .default_value("1440")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_ROTATION_GRACE_SECONDS)
                .long(ARG_SESSION_ROTATION_GRACE_SECONDS)
                .help("Seconds a replaced session id keeps working for in-flight requests")
                .env("ANIMEDEN_SESSION_ROTATION_GRACE_SECONDS")
                .default_value("30")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub cookie_secure: bool,
    pub idle_seconds: u64,
    pub rotation_grace_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if a session argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            cookie_secure: matches
                .get_one::<bool>(ARG_SESSION_COOKIE_SECURE)
                .copied()
                .context("missing required argument: --session-cookie-secure")?,
            idle_seconds: matches
                .get_one::<u64>(ARG_SESSION_IDLE_SECONDS)
                .copied()
                .context("missing required argument: --session-idle-seconds")?,
            rotation_grace_seconds: matches
                .get_one::<u64>(ARG_SESSION_ROTATION_GRACE_SECONDS)
                .copied()
                .context("missing required argument: --session-rotation-grace-seconds")?,
        })
    }
}
