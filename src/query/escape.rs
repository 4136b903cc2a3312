//! Query-component percent-encoding (`application/x-www-form-urlencoded`)

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode, utf8_percent_encode};
use thiserror::Error;

/// Everything except ASCII alphanumerics and `-_.~` is escaped. Space is left
/// alone here and turned into `+` afterwards.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b' ');

/// Errors from decoding a query component
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscapeError {
    #[error("invalid escape {sequence:?} at byte {offset}")]
    InvalidEscape { offset: usize, sequence: String },

    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Escape a string for use as a query key or value
pub fn escape(input: &str) -> String {
    utf8_percent_encode(input, QUERY_COMPONENT)
        .to_string()
        .replace(' ', "+")
}

/// Decode a query component. `+` becomes a space and every `%` must start a
/// two-digit hex escape.
pub fn unescape(input: &str) -> Result<String, EscapeError> {
    let bytes = input.as_bytes();
    for (offset, _) in input.match_indices('%') {
        let escape = bytes.get(offset + 1..offset + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            let end = (offset + 3).min(bytes.len());
            return Err(EscapeError::InvalidEscape {
                offset,
                sequence: String::from_utf8_lossy(&bytes[offset..end]).into_owned(),
            });
        }
    }

    let spaced = input.replace('+', " ");
    percent_decode(spaced.as_bytes())
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| EscapeError::InvalidUtf8)
}
