//! Brute-force guard over recorded login failures.

use tracing::debug;

use super::{store::CredentialStore, AuthError};

/// Failures older than this (in seconds) no longer count.
pub const ATTEMPT_WINDOW_SECONDS: i64 = 2 * 60 * 60;
/// Locked once the window holds more failures than this.
pub const MAX_FAILED_ATTEMPTS: i64 = 5;

/// Whether `user_id` is currently locked out.
///
/// Counts failures with `timestamp > now - ATTEMPT_WINDOW_SECONDS`; exactly
/// [`MAX_FAILED_ATTEMPTS`] failures is still allowed. Read-only.
///
/// # Errors
/// Returns [`AuthError::Database`] if the attempt count cannot be read.
pub async fn is_locked(
    store: &dyn CredentialStore,
    user_id: i64,
    now: i64,
) -> Result<bool, AuthError> {
    let since = now.saturating_sub(ATTEMPT_WINDOW_SECONDS);
    let attempts = store.count_attempts_since(user_id, since).await?;
    debug!(user_id, attempts, "counted recent login failures");
    Ok(attempts > MAX_FAILED_ATTEMPTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{LoginAttempt, MemoryCredentialStore};

    const NOW: i64 = 1_700_000_000;

    fn seed(store: &MemoryCredentialStore, user_id: i64, count: usize, age_seconds: i64) {
        for _ in 0..count {
            store.push_attempt(LoginAttempt {
                user_id,
                timestamp: NOW - age_seconds,
            });
        }
    }

    #[tokio::test]
    async fn no_attempts_is_not_locked() -> Result<(), AuthError> {
        let store = MemoryCredentialStore::new();
        assert!(!is_locked(&store, 1, NOW).await?);
        Ok(())
    }

    #[tokio::test]
    async fn five_attempts_is_not_locked() -> Result<(), AuthError> {
        let store = MemoryCredentialStore::new();
        seed(&store, 1, 5, 60);
        assert!(!is_locked(&store, 1, NOW).await?);
        Ok(())
    }

    #[tokio::test]
    async fn six_attempts_is_locked() -> Result<(), AuthError> {
        let store = MemoryCredentialStore::new();
        seed(&store, 1, 6, 60);
        assert!(is_locked(&store, 1, NOW).await?);
        Ok(())
    }

    #[tokio::test]
    async fn attempts_outside_window_are_ignored() -> Result<(), AuthError> {
        let store = MemoryCredentialStore::new();
        seed(&store, 1, 5, 60);
        seed(&store, 1, 10, ATTEMPT_WINDOW_SECONDS + 1);
        assert!(!is_locked(&store, 1, NOW).await?);
        Ok(())
    }

    #[tokio::test]
    async fn attempt_exactly_at_window_edge_is_ignored() -> Result<(), AuthError> {
        let store = MemoryCredentialStore::new();
        seed(&store, 1, 5, 60);
        seed(&store, 1, 1, ATTEMPT_WINDOW_SECONDS);
        assert!(!is_locked(&store, 1, NOW).await?);

        seed(&store, 1, 1, ATTEMPT_WINDOW_SECONDS - 1);
        assert!(is_locked(&store, 1, NOW).await?);
        Ok(())
    }

    #[tokio::test]
    async fn attempts_are_counted_per_user() -> Result<(), AuthError> {
        let store = MemoryCredentialStore::new();
        seed(&store, 2, 6, 60);
        assert!(!is_locked(&store, 1, NOW).await?);
        assert!(is_locked(&store, 2, NOW).await?);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_an_error() {
        let store = MemoryCredentialStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            is_locked(&store, 1, NOW).await,
            Err(AuthError::Database { .. })
        ));
    }
}
