//! # Animeden (anime catalog site backend)
//!
//! `animeden` serves the member-facing side of a small anime catalog site.
//! The catalog pages themselves are plain database passthroughs and live
//! elsewhere; this crate owns who is logged in and whether a session can
//! still be trusted.
//!
//! ## Authentication
//!
//! Members log in with email and password. The stored hash is
//! `sha512(password + salt)` in lowercase hex. Every failed password
//! comparison is recorded in `login_attempts`, and more than five failures
//! inside a trailing two-hour window lock the account. A locked account is
//! refused even when the password is correct, and the refusal itself is not
//! recorded.
//!
//! ## Sessions
//!
//! Session data lives server-side, keyed by the `sec_session_id` cookie.
//! The cookie is `HttpOnly`, optionally `Secure`, and the id is regenerated
//! on every request that starts a session. A session is bound to the member's
//! password hash and the browser's user agent through a login string; if
//! either changes, the session stops validating.

pub mod api;
pub mod auth;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
