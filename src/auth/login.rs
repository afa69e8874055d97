//! Email/password login.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, instrument, warn};

use super::{
    brute_force::is_locked,
    sanitize::{sanitize_user_id, sanitize_username},
    session::SessionData,
    store::{CredentialStore, LoginAttempt},
    utils::{hash_password, hashes_match, login_string, unix_now},
    AuthError,
};

/// Check `email`/`password` and, on success, populate `session`.
///
/// - Unknown email: `Ok(false)`, nothing recorded.
/// - Locked account: `Ok(false)` without comparing the password and without
///   recording the attempt.
/// - Wrong password: one `login_attempts` row, `Ok(false)`.
/// - Correct password: sanitized `user_id`/`username` plus the login string
///   bound to `user_agent` are written to `session`, `Ok(true)`.
///
/// `session` is left untouched unless the login succeeds.
///
/// # Errors
/// Returns [`AuthError::Database`] if the store fails at any step.
#[instrument(skip_all)]
pub async fn login(
    store: &dyn CredentialStore,
    session: &mut SessionData,
    email: &str,
    password: &SecretString,
    user_agent: &str,
) -> Result<bool, AuthError> {
    let Some(member) = store.member_by_email(email).await? else {
        debug!("login failed: no member for email");
        return Ok(false);
    };

    let candidate = hash_password(password.expose_secret(), &member.salt);

    if is_locked(store, member.id, unix_now()).await? {
        warn!(user_id = member.id, "login refused: account locked");
        return Ok(false);
    }

    if !hashes_match(&candidate, &member.password_hash) {
        store
            .record_attempt(LoginAttempt {
                user_id: member.id,
                timestamp: unix_now(),
            })
            .await?;
        debug!(user_id = member.id, "login failed: wrong password");
        return Ok(false);
    }

    session.user_id = Some(sanitize_user_id(&member.id.to_string()));
    session.username = Some(sanitize_username(&member.username));
    session.login_string = Some(login_string(&member.password_hash, user_agent));

    info!(user_id = member.id, "login succeeded");
    Ok(true)
}
