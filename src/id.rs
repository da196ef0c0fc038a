//! `_id` allocation.
//!
//! When an inserted document has no `_id`, the store synthesizes a
//! 24-character lowercase hex string: the first 8 characters encode the
//! insert-time unix second, big-endian; the remaining 16 are drawn from a
//! random source. This mirrors the shape of `bson::oid::ObjectId`
//! (timestamp prefix + random tail) without reusing its 12-byte layout,
//! since this id has no embedded counter.

use rand::RngCore;

/// Generates a new `_id` value for a document that did not supply one,
/// timestamped from the caller-supplied clock rather than the wall clock,
/// so it agrees with the `created_at` the same mutation stamps onto
/// collection metadata.
pub fn generate(now_millis: i64) -> String {
    let unix_secs = (now_millis / 1000).clamp(0, u32::MAX as i64) as u32;
    generate_at(unix_secs)
}

fn generate_at(unix_secs: u32) -> String {
    let mut bytes = [0u8; 12];
    bytes[0..4].copy_from_slice(&unix_secs.to_be_bytes());
    rand::rng().fill_bytes(&mut bytes[4..12]);
    hex::encode(bytes)
}

/// Validates the length constraint every `_id` must satisfy (supplied or
/// synthesized): 1-256 characters.
pub fn is_valid_length(id: &str) -> bool {
    let len = id.len();
    (1..=256).contains(&len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_24_lowercase_hex_chars() {
        let id = generate(1_700_000_000_000);
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_ids_embed_the_insert_second_as_a_prefix() {
        let id = generate_at(0x0102_0304);
        assert_eq!(&id[0..8], "01020304");
    }

    #[test]
    fn now_millis_is_truncated_to_unix_seconds() {
        let id = generate(1_234_000);
        assert_eq!(&id[0..8], &format!("{:08x}", 1234u32));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = generate(1_700_000_000_000);
        let b = generate(1_700_000_000_000);
        assert_ne!(a, b);
    }

    #[test]
    fn length_validation_accepts_one_to_256_chars() {
        assert!(!is_valid_length(""));
        assert!(is_valid_length("a"));
        assert!(is_valid_length(&"a".repeat(256)));
        assert!(!is_valid_length(&"a".repeat(257)));
    }
}
