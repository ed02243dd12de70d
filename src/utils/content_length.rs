//! Content length and content range parsing.
//!
//! These helpers read the two headers the downloader cares about: the
//! `Content-Length` announced by the size probe and the start offset of a
//! `Content-Range` sent along with a partial response.

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_RANGE};

/// Parse a `Content-Length` value.
///
/// Only a non-empty run of ASCII digits is accepted. Signs, whitespace inside
/// the value, or anything overflowing a `u64` are treated as malformed.
///
/// # Example
///
/// ```rust
/// use stubborn::utils::parse_content_length;
///
/// assert_eq!(parse_content_length("2048"), Some(2048));
/// assert_eq!(parse_content_length("-1"), None);
/// ```
pub fn parse_content_length(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok()
}

/// Parse a `Content-Range` value and return the first byte position.
///
/// Expected format: `bytes <start>-<end>/<total>`, where `<total>` may be `*`.
/// Anything that does not match the format as a whole yields `None`, even if a
/// start offset could be picked out of it.
///
/// # Example
///
/// ```rust
/// use stubborn::utils::parse_content_range_start;
///
/// assert_eq!(parse_content_range_start("bytes 200-1023/1024"), Some(200));
/// assert_eq!(parse_content_range_start("bytes 0-99/*"), Some(0));
/// assert_eq!(parse_content_range_start("bytes */1024"), None);
/// ```
pub fn parse_content_range_start(content_range: &str) -> Option<u64> {
    let rest = content_range.trim().strip_prefix("bytes")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let (range, total) = rest.trim_start().split_once('/')?;
    let (start, end) = range.split_once('-')?;

    if total != "*" {
        parse_digits(total)?;
    }
    parse_digits(end)?;
    parse_digits(start)
}

fn parse_digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<u64>().ok()
}

/// Read the `Content-Length` header out of a header map.
pub fn content_length_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_length)
}

/// Read the start offset of the `Content-Range` header out of a header map.
pub fn content_range_start_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_start)
}
