// Shared helpers for reading delimited files.
//
// Both input files are produced by pandas, so "missing" follows pandas'
// default NA markers rather than just the empty string.

use std::borrow::Cow;

/// Cell values pandas reads as NaN by default.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// True if a raw cell value should be treated as missing.
pub fn is_missing(raw: &str) -> bool {
    NA_MARKERS.contains(&raw)
}

/// Decode a raw field, replacing invalid UTF-8 rather than failing the row.
pub fn decode_field(bytes: &[u8]) -> String {
    decode_field_checked(bytes).0
}

/// Decode a raw field and report whether any bytes had to be replaced.
///
/// Distinct invalid byte sequences all decode to U+FFFD, so callers count
/// replaced fields and warn about possible collisions.
pub fn decode_field_checked(bytes: &[u8]) -> (String, bool) {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(s) => (s.to_string(), false),
        Cow::Owned(s) => (s, true),
    }
}

/// Decode a header field. Strips a leading byte-order mark so the first
/// column name matches what the user configured.
pub fn decode_header(bytes: &[u8]) -> String {
    decode_field(bytes).trim_start_matches('\u{feff}').to_string()
}

/// Parse a delimiter given as a single character (`;`, `,`, `\t`).
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "\\t" | "tab" => Some(b'\t'),
        _ => {
            let bytes = raw.as_bytes();
            if bytes.len() == 1 {
                Some(bytes[0])
            } else {
                None
            }
        }
    }
}
