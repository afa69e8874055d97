//! Output sanitizers for values that end up in markup.

use regex::Regex;

/// Keep only ASCII digits.
#[must_use]
pub fn sanitize_user_id(user_id: &str) -> String {
    user_id.chars().filter(char::is_ascii_digit).collect()
}

/// Keep only `[a-zA-Z0-9_-]`.
#[must_use]
pub fn sanitize_username(username: &str) -> String {
    username
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Escape the five HTML special characters.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn url_char_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || !c.is_ascii() || "-~+_.?#=!&;,/:%@$|*'()".contains(c)
}

/// Clean a self-referencing URL for use in an `href` or form `action`.
///
/// Drops characters outside the URL-safe set, strips encoded CR/LF (repeatedly,
/// so `%0%0dd` cannot reassemble), repairs `;//` into `://` and entity-encodes
/// `&` and `'`. Only relative URLs starting with `/` survive; anything else
/// becomes the empty string.
#[must_use]
pub fn esc_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let Ok(encoded_crlf) = Regex::new(r"(?i)%0[ad]") else {
        return String::new();
    };

    let mut cleaned: String = url.chars().filter(|c| url_char_allowed(*c)).collect();
    while encoded_crlf.is_match(&cleaned) {
        cleaned = encoded_crlf.replace_all(&cleaned, "").into_owned();
    }
    let cleaned = cleaned.replace(";//", "://");

    let mut out = String::with_capacity(cleaned.len());
    for c in cleaned.chars() {
        match c {
            '&' => out.push_str("&#038;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }

    if out.starts_with('/') {
        out
    } else {
        String::new()
    }
}
