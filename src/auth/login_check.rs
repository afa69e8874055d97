use tracing::{debug, instrument};

use super::{
    session::SessionData,
    store::CredentialStore,
    utils::{hashes_match, login_string},
    AuthError,
};

/// Whether `session` still belongs to a logged-in member on this browser.
///
/// Recomputes the login string from the member's current password hash and
/// `user_agent`. Missing session fields, a non-numeric id, a vanished member,
/// a changed password or a different user agent all yield `Ok(false)`.
///
/// # Errors
/// Returns [`AuthError::Database`] if the password hash cannot be read.
#[instrument(skip_all)]
pub async fn login_check(
    store: &dyn CredentialStore,
    session: &SessionData,
    user_agent: &str,
) -> Result<bool, AuthError> {
    let (Some(user_id), Some(_), Some(expected)) = (
        session.user_id.as_deref(),
        session.username.as_deref(),
        session.login_string.as_deref(),
    ) else {
        return Ok(false);
    };

    let Ok(user_id) = user_id.parse::<i64>() else {
        debug!("session user id is not numeric");
        return Ok(false);
    };

    let Some(password_hash) = store.password_hash_by_id(user_id).await? else {
        debug!(user_id, "session refers to a missing member");
        return Ok(false);
    };

    let valid = hashes_match(&login_string(&password_hash, user_agent), expected);
    if !valid {
        debug!(user_id, "login string mismatch");
    }
    Ok(valid)
}
