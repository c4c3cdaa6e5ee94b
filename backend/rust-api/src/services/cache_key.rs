use sha2::{Digest, Sha256};

use crate::models::Difficulty;

/// Sentinel user for requests without a user id, so anonymous requests share
/// cache entries with each other but never with a named user.
pub const ANONYMOUS_USER: &str = "anonymous";

const KEY_PREFIX: &str = "quizgen";
const FINGERPRINT_BYTES: usize = 8;

/// Deterministic cache key for a generation request. The content goes in as
/// a SHA-256 fingerprint to bound key length; difficulty, count, attempt
/// number and user id follow, colon-delimited.
///
/// The attempt number is part of the key on purpose: a retry must bypass the
/// entry cached for the previous attempt even when everything else matches.
pub fn build_key(
    content: &str,
    difficulty: Difficulty,
    count: u8,
    attempt_number: u32,
    user_id: Option<&str>,
) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let fingerprint = hex::encode(&digest[..FINGERPRINT_BYTES]);

    format!(
        "{}:{}:{}:{}:{}:{}",
        KEY_PREFIX,
        fingerprint,
        difficulty.as_str(),
        count,
        attempt_number,
        user_id.unwrap_or(ANONYMOUS_USER),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty::{Easy, Medium};

    const CONTENT: &str = "An introductory tutorial about ownership and borrowing in Rust.";

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let a = build_key(CONTENT, Medium, 3, 0, Some("user-1"));
        let b = build_key(CONTENT, Medium, 3, 0, Some("user-1"));
        assert_eq!(a, b);
    }

    #[test]
    fn attempt_number_alone_changes_the_key() {
        let first = build_key(CONTENT, Medium, 3, 0, Some("user-1"));
        let retry = build_key(CONTENT, Medium, 3, 1, Some("user-1"));
        assert_ne!(first, retry);
    }

    #[test]
    fn each_field_contributes_to_the_key() {
        let base = build_key(CONTENT, Medium, 3, 0, Some("user-1"));
        assert_ne!(base, build_key("different content body", Medium, 3, 0, Some("user-1")));
        assert_ne!(base, build_key(CONTENT, Easy, 3, 0, Some("user-1")));
        assert_ne!(base, build_key(CONTENT, Medium, 5, 0, Some("user-1")));
        assert_ne!(base, build_key(CONTENT, Medium, 3, 0, Some("user-2")));
    }

    #[test]
    fn missing_user_falls_back_to_anonymous() {
        let anon = build_key(CONTENT, Medium, 3, 0, None);
        assert!(anon.ends_with(":anonymous"));
        assert_eq!(anon, build_key(CONTENT, Medium, 3, 0, Some(ANONYMOUS_USER)));
    }

    #[test]
    fn raw_content_never_appears_in_the_key() {
        let key = build_key(CONTENT, Medium, 3, 0, None);
        assert!(!key.contains("tutorial"));
        // prefix + 16 hex chars + the four fields
        assert!(key.starts_with("quizgen:"));
        assert!(key.len() < 64);
    }
}
