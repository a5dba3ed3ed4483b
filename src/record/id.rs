//! Share identifier generation and validation.

use rand::Rng;

/// Characters used for generated identifiers.
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated identifiers (36^10 possible values).
pub const ID_LENGTH: usize = 10;

/// Longest identifier accepted on lookup.
pub const MAX_ID_LENGTH: usize = 64;

/// Draw a fresh random identifier.
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Check whether `id` is safe to use as a record file stem.
///
/// Only ASCII alphanumerics, `-` and `_` are allowed, so separators,
/// `..` and NUL can never reach the filesystem.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
