use thiserror::Error;

/// Operation label used for failed lookups and counts.
pub(crate) const OP_STATEMENT: &str = "cannot prepare statement";
/// Operation label used when a failed attempt cannot be recorded.
pub(crate) const OP_LOGIN_ATTEMPTS: &str = "login_attempts";

/// Infrastructure failures that stop a request.
///
/// The `Display` text is what ends up in the error page query string, so it
/// must never contain credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Database error: {operation}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Could not initiate a safe session ({0})")]
    InsecureSession(String),
}

impl AuthError {
    /// Adapter for `map_err` on sqlx results.
    pub(crate) fn database(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Database { operation, source }
    }
}
