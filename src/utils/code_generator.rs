//! Short code generation.
//!
//! Codes are drawn uniformly, one character at a time, from the 62-symbol
//! ASCII alphanumeric alphabet. The generator makes no uniqueness promise;
//! collisions are caught by the store's unique constraint and retried by
//! [`crate::application::services::LinkService`].

use rand::Rng;

/// Upper, lower and digit characters.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated codes unless configured otherwise.
pub const DEFAULT_CODE_LENGTH: usize = 7;

/// Longest code accepted on lookup. Matches the `short_code` column width.
pub const MAX_CODE_LENGTH: usize = 32;

/// Fixed routes sharing the `/{code}` path space. Matching is
/// case-sensitive, like the router.
pub const RESERVED_CODES: &[&str] = &["shorten", "health"];

/// Generates a random short code of `length` characters using the thread RNG.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7);
/// assert_eq!(code.len(), 7);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    generate_code_with(&mut rand::rng(), length)
}

/// Generates a code from an explicit random source.
///
/// Draws that land on a [`RESERVED_CODES`] entry are discarded.
pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    first_unreserved(|| {
        (0..length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    })
}

fn first_unreserved(mut draw: impl FnMut() -> String) -> String {
    loop {
        let code = draw();
        if !is_reserved(&code) {
            return code;
        }
    }
}

/// Returns true if `code` names a fixed route and can never be redirected.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Returns true if `code` could have been issued by [`generate_code`].
///
/// Used to turn obviously foreign paths (`favicon.ico`, `a-b`) into a
/// not-found without touching the cache or the store.
pub fn is_well_formed(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
