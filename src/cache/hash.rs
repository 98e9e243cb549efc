//! Cache key derivation.
//!
//! Keys must match the blobs written by earlier browser sessions, so the
//! checksum walks UTF-16 code units and wraps exactly like a 32-bit signed
//! integer would.

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Non-cryptographic rolling checksum of `text`, rendered in base 36.
///
/// Collisions are possible. Two different texts with the same checksum and
/// language pair share a cache slot.
pub fn rolling_hash(text: &str) -> String {
    let mut h: i32 = 0;
    for unit in text.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    to_base36(h.unsigned_abs())
}

/// Cache key (and durable record id) for a text and language pair
pub fn cache_key(text: &str, source_language: &str, target_language: &str) -> String {
    format!("{}_{}_{}", source_language, target_language, rolling_hash(text))
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(rolling_hash(""), "0");
        assert_eq!(rolling_hash("a"), "2p");
        assert_eq!(rolling_hash("Hello"), "15fz5e");
        assert_eq!(rolling_hash("Your order #{{id}} is ready"), "ly6tvy");
    }

    #[test]
    fn test_negative_accumulator_uses_absolute_value() {
        // Both accumulate to a negative i32 before the final abs
        assert_eq!(rolling_hash("Hello world"), "drxx7g");
        assert_eq!(rolling_hash("Welcome"), "n3v5j2");
        assert_eq!(rolling_hash("Bonjour le monde, ceci est un test"), "jzx6aq");
    }

    #[test]
    fn test_surrogate_pairs_hash_per_code_unit() {
        assert_eq!(rolling_hash("🍕"), "1207t");
    }

    #[test]
    fn test_base36_extremes() {
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(i32::MIN.unsigned_abs()), "zik0zk");
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        let first = cache_key("Hello", "en", "fr");
        for _ in 0..10 {
            assert_eq!(cache_key("Hello", "en", "fr"), first);
        }
        assert_eq!(first, "en_fr_15fz5e");
    }

    #[test]
    fn test_cache_key_separates_language_pairs() {
        assert_ne!(cache_key("Hello", "en", "fr"), cache_key("Hello", "en", "de"));
        assert_ne!(cache_key("Hello", "en", "fr"), cache_key("Hello", "fr", "en"));
    }

    #[test]
    fn test_collisions_are_possible() {
        // "Aa" and "BB" share a checksum: 65*31+97 == 66*31+66
        assert_eq!(rolling_hash("Aa"), rolling_hash("BB"));
        assert_eq!(cache_key("Aa", "en", "fr"), cache_key("BB", "en", "fr"));
    }
}
