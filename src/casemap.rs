//! IRC case-folding for channel and nick keys.
//!
//! Channel names and nicknames are compared using the `rfc1459` case
//! mapping, where `[]\~` are the uppercase forms of `{}|^`. Everything the
//! store keys on goes through [`irc_to_lower`] first.

/// Fold a single character using the RFC 1459 mapping.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Fold a string using the RFC 1459 mapping.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive equality under the RFC 1459 mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// Storage key for a channel: trimmed and folded, without validation.
pub fn fold_channel(name: &str) -> String {
    irc_to_lower(name.trim())
}

/// Canonical channel key: trimmed and folded.
///
/// Returns `None` for anything that is not a channel name (`#` or `&` prefix).
pub fn channel_key(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.len() < 2 || !(trimmed.starts_with('#') || trimmed.starts_with('&')) {
        return None;
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c == ',') {
        return None;
    }
    Some(fold_channel(trimmed))
}
