//! Hashing, comparison and id helpers shared by the auth flows.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha512};
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// SHA-512 over the concatenation of `parts`, lowercase hex.
fn sha512_hex(parts: &[&str]) -> String {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Stored password format: `sha512(password + salt)`.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    sha512_hex(&[password, salt])
}

/// Binds a session to the member's password hash and the browser.
#[must_use]
pub fn login_string(password_hash: &str, user_agent: &str) -> String {
    sha512_hex(&[password_hash, user_agent])
}

/// Constant-time string equality; different lengths never match.
pub(super) fn hashes_match(left: &str, right: &str) -> bool {
    left.as_bytes().ct_eq(right.as_bytes()).into()
}

/// Current time in unix seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

/// Fresh session identifier: 32 random bytes, base64url without padding.
pub(super) fn generate_session_id() -> Result<String, rand::Error> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA512_ABC: &str = "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                              2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f";

    #[test]
    fn hash_password_concatenates_password_and_salt() {
        assert_eq!(hash_password("ab", "c"), SHA512_ABC);
        assert_eq!(hash_password("abc", ""), SHA512_ABC);
        assert_eq!(hash_password("", "abc"), SHA512_ABC);
    }

    #[test]
    fn login_string_is_lowercase_hex() {
        let value = login_string(SHA512_ABC, "Mozilla/5.0");
        assert_eq!(value.len(), 128);
        assert!(value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn login_string_depends_on_user_agent() {
        assert_ne!(
            login_string(SHA512_ABC, "Mozilla/5.0"),
            login_string(SHA512_ABC, "curl/8.0")
        );
    }

    #[test]
    fn hashes_match_requires_equal_length_and_content() {
        assert!(hashes_match("abc", "abc"));
        assert!(!hashes_match("abc", "abd"));
        assert!(!hashes_match("abc", "abcd"));
        assert!(!hashes_match("", "a"));
    }

    #[test]
    fn generate_session_id_is_url_safe_and_unique() {
        let first = generate_session_id().ok();
        let second = generate_session_id().ok();
        assert!(first.is_some());
        assert_ne!(first, second);

        let decoded_len = first
            .as_deref()
            .and_then(|id| Base64UrlUnpadded::decode_vec(id).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn unix_now_is_after_2020() {
        assert!(unix_now() > 1_577_836_800);
    }
}
