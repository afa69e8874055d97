//! Credential store seam.
//!
//! The auth flows only ever need four questions answered, so the store is a
//! trait: [`PgCredentialStore`] in production, [`MemoryCredentialStore`] for
//! tests and local runs. Every query is parameterized.

mod memory;
mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

use async_trait::async_trait;

use super::AuthError;

/// A row from `members`, as needed for login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
}

/// A failed password comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoginAttempt {
    pub user_id: i64,
    /// Unix seconds.
    pub timestamp: i64,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// At most one member per email.
    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, AuthError>;

    async fn password_hash_by_id(&self, user_id: i64) -> Result<Option<String>, AuthError>;

    /// Attempts for `user_id` with `timestamp > since`.
    async fn count_attempts_since(&self, user_id: i64, since: i64) -> Result<i64, AuthError>;

    async fn record_attempt(&self, attempt: LoginAttempt) -> Result<(), AuthError>;

    /// Liveness check for `/health`.
    async fn ping(&self) -> Result<(), AuthError>;
}
