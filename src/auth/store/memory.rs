use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use super::{CredentialStore, LoginAttempt, Member};
use crate::auth::error::{AuthError, OP_LOGIN_ATTEMPTS, OP_STATEMENT};

#[derive(Debug, Default)]
struct Tables {
    /// (email, member)
    members: Vec<(String, Member)>,
    login_attempts: Vec<LoginAttempt>,
}

/// In-process credential store.
///
/// Mirrors the Postgres semantics closely enough for the auth flows and can
/// be switched into an "unavailable" mode to exercise the fail-closed paths.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, operation: &'static str) -> Result<(), AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::Database {
                operation,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(())
    }

    /// Insert or replace the member registered under `email`.
    pub fn insert_member(&self, email: &str, member: Member) {
        let mut tables = self.tables();
        tables.members.retain(|(existing, _)| existing != email);
        tables.members.push((email.to_string(), member));
    }

    pub fn remove_member(&self, user_id: i64) {
        self.tables()
            .members
            .retain(|(_, member)| member.id != user_id);
    }

    /// Simulates an out-of-band password change.
    pub fn set_password_hash(&self, user_id: i64, password_hash: &str) {
        for (_, member) in &mut self.tables().members {
            if member.id == user_id {
                member.password_hash = password_hash.to_string();
            }
        }
    }

    /// Seeds an attempt row directly, bypassing the auth flows.
    pub fn push_attempt(&self, attempt: LoginAttempt) {
        self.tables().login_attempts.push(attempt);
    }

    #[must_use]
    pub fn attempts_for(&self, user_id: i64) -> usize {
        self.tables()
            .login_attempts
            .iter()
            .filter(|attempt| attempt.user_id == user_id)
            .count()
    }

    /// When set, every call fails like a dropped database connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn member_by_email(&self, email: &str) -> Result<Option<Member>, AuthError> {
        self.check_available(OP_STATEMENT)?;
        Ok(self
            .tables()
            .members
            .iter()
            .find(|(existing, _)| existing == email)
            .map(|(_, member)| member.clone()))
    }

    async fn password_hash_by_id(&self, user_id: i64) -> Result<Option<String>, AuthError> {
        self.check_available(OP_STATEMENT)?;
        Ok(self
            .tables()
            .members
            .iter()
            .find(|(_, member)| member.id == user_id)
            .map(|(_, member)| member.password_hash.clone()))
    }

    async fn count_attempts_since(&self, user_id: i64, since: i64) -> Result<i64, AuthError> {
        self.check_available(OP_STATEMENT)?;
        let count = self
            .tables()
            .login_attempts
            .iter()
            .filter(|attempt| attempt.user_id == user_id && attempt.timestamp > since)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn record_attempt(&self, attempt: LoginAttempt) -> Result<(), AuthError> {
        self.check_available(OP_LOGIN_ATTEMPTS)?;
        self.tables().login_attempts.push(attempt);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AuthError> {
        self.check_available(OP_STATEMENT)
    }
}
