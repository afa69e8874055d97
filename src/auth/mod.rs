//! Member authentication and session integrity.
//!
//! The pieces, leaf first:
//!
//! - [`store`]: the credential store seam (`members`, `login_attempts`).
//! - [`is_locked`]: brute-force guard over the trailing lockout window.
//! - [`login`]: email/password check that populates a [`SessionData`].
//! - [`login_check`]: per-request validation of the login string.
//! - [`SessionStore`]: cookie-only session bootstrap with id regeneration.
//!
//! Expected outcomes (wrong password, locked account, no session) are
//! `Ok(false)`. Infrastructure failures are an [`AuthError`] and it is up to
//! the HTTP layer to decide the response.

mod brute_force;
mod error;
mod login;
mod login_check;
pub mod sanitize;
mod session;
mod state;
pub mod store;
mod utils;

pub use brute_force::{is_locked, ATTEMPT_WINDOW_SECONDS, MAX_FAILED_ATTEMPTS};
pub use error::AuthError;
pub use login::login;
pub use login_check::login_check;
pub use session::{Session, SessionConfig, SessionData, SessionStore, SESSION_COOKIE_NAME};
pub use state::AuthState;
pub use utils::{hash_password, login_string, unix_now};
