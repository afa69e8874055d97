use crate::{api, auth::SessionConfig};
use anyhow::Result;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub db_max_connections: u32,
    pub session_cookie_secure: bool,
    pub session_idle_seconds: u64,
    pub session_rotation_grace_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let session_config = SessionConfig::new()
        .with_cookie_secure(args.session_cookie_secure)
        .with_idle_timeout(Duration::from_secs(args.session_idle_seconds))
        .with_rotation_grace(Duration::from_secs(args.session_rotation_grace_seconds));

    api::new(
        args.port,
        args.dsn,
        args.db_max_connections,
        session_config,
    )
    .await
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        dsn = %redact_dsn(&args.dsn),
        db_max_connections = args.db_max_connections,
        session_cookie_secure = args.session_cookie_secure,
        session_idle_seconds = args.session_idle_seconds,
        session_rotation_grace_seconds = args.session_rotation_grace_seconds,
        "Starting server"
    );
}

/// DSN with any password replaced, for logging.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("REDACTED")).is_err() {
                return "<redacted>".to_string();
            }
            url.to_string()
        }
        Err(_) => "<unparseable>".to_string(),
    }
}
