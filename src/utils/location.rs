//! `Location` header encoding for redirects.
//!
//! Stored URLs are kept verbatim, so they may contain spaces, control
//! characters or non-ASCII text that a header value cannot carry. Those bytes
//! are percent-encoded on the way out; URL punctuation and existing `%XX`
//! escapes pass through untouched.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes left as-is: unreserved marks plus the URL delimiters
/// `:/%#?=@[]!$&'()*+,;`.
const LOCATION_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'%')
    .remove(b'#')
    .remove(b'?')
    .remove(b'=')
    .remove(b'@')
    .remove(b'[')
    .remove(b']')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';');

/// Encodes a stored URL for use as a `Location` header value.
///
/// The result is always visible ASCII and therefore a valid header value.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(redirect_location("https://a.example/\nx"), "https://a.example/%0Ax");
/// ```
pub fn redirect_location(original_url: &str) -> String {
    utf8_percent_encode(original_url, LOCATION_SAFE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_well_formed_url_is_unchanged() {
        let url = "https://example.com/a-b_c.d~e/path?q=1&r=two;x=(y)*+,!$'@[::1]#frag";
        assert_eq!(redirect_location(url), url);
    }

    #[test]
    fn test_existing_escapes_are_not_doubled() {
        assert_eq!(
            redirect_location("https://example.com/a%20b"),
            "https://example.com/a%20b"
        );
    }

    #[test]
    fn test_control_characters_and_spaces_are_encoded() {
        assert_eq!(
            redirect_location("https://a.example/\nx"),
            "https://a.example/%0Ax"
        );
        assert_eq!(
            redirect_location("https://a.example/a b\tc\r"),
            "https://a.example/a%20b%09c%0D"
        );
        assert_eq!(redirect_location("just some text"), "just%20some%20text");
    }

    #[test]
    fn test_non_ascii_is_utf8_encoded() {
        assert_eq!(
            redirect_location("https://example.com/パス"),
            "https://example.com/%E3%83%91%E3%82%B9"
        );
    }

    #[test]
    fn test_result_is_always_a_header_value() {
        for url in [
            "https://a.example/\nx",
            "\u{0}\u{7f}\"<>\\^`{|}",
            "https://例え.jp/パス",
        ] {
            let encoded = redirect_location(url);
            assert!(HeaderValue::from_str(&encoded).is_ok(), "{encoded}");
        }
    }
}
