//! `Range` header parsing and partial-content responses.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

const LOGFILE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Errors surfaced by the logfile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogfileError {
    /// Malformed, multi-range, evicted or out-of-bounds range.
    #[error("requested range not satisfiable (stream length {total})")]
    RangeNotSatisfiable { total: u64 },
}

impl IntoResponse for LogfileError {
    fn into_response(self) -> Response {
        match self {
            LogfileError::RangeNotSatisfiable { total } => (
                StatusCode::RANGE_NOT_SATISFIABLE,
                [(header::CONTENT_RANGE, format!("bytes */{}", total))],
                self.to_string(),
            )
                .into_response(),
        }
    }
}

/// A single byte range in the `bytes` unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=<start>-` or `bytes=<start>-<end>` (inclusive).
    From { start: u64, end: Option<u64> },
    /// `bytes=-<n>`: the last `n` bytes.
    Suffix(u64),
}

impl ByteRange {
    /// Parse a `Range` header value. Multi-range requests are not supported.
    pub fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?.trim();
        if spec.contains(',') {
            return None;
        }
        let (first, last) = spec.split_once('-')?;
        let (first, last) = (first.trim(), last.trim());

        if first.is_empty() {
            return last.parse().ok().map(ByteRange::Suffix);
        }
        let start = first.parse().ok()?;
        let end = if last.is_empty() {
            None
        } else {
            Some(last.parse().ok()?)
        };
        Some(ByteRange::From { start, end })
    }

    /// Resolve against the retained window `[floor, total)` of the stream.
    ///
    /// Returns inclusive absolute offsets, or `None` when the range cannot be
    /// served from what is retained.
    pub fn resolve(self, floor: u64, total: u64) -> Option<(u64, u64)> {
        if total == 0 {
            return None;
        }
        let last = total - 1;
        match self {
            ByteRange::From { start, end } => {
                let end = end.map_or(last, |end| end.min(last));
                if start > end || start < floor {
                    return None;
                }
                Some((start, end))
            }
            ByteRange::Suffix(0) => None,
            ByteRange::Suffix(n) => Some((total.saturating_sub(n).max(floor), last)),
        }
    }
}

/// A resolved read of the log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSlice {
    pub body: Vec<u8>,
    /// Inclusive absolute offsets for partial content, `None` for the whole stream.
    pub range: Option<(u64, u64)>,
    /// Total bytes ever written to the stream.
    pub total: u64,
}

impl LogSlice {
    pub fn status(&self) -> StatusCode {
        if self.range.is_some() {
            StatusCode::PARTIAL_CONTENT
        } else {
            StatusCode::OK
        }
    }

    pub fn content_range(&self) -> Option<String> {
        self.range
            .map(|(start, end)| format!("bytes {}-{}/{}", start, end, self.total))
    }
}

impl IntoResponse for LogSlice {
    fn into_response(self) -> Response {
        let status = self.status();
        let content_range = self.content_range();

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(LOGFILE_CONTENT_TYPE));
        if let Some(value) = content_range.and_then(|v| HeaderValue::from_str(&v).ok()) {
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            headers.insert(header::CONTENT_RANGE, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            ByteRange::parse("bytes=5-10"),
            Some(ByteRange::From { start: 5, end: Some(10) })
        );
        assert_eq!(
            ByteRange::parse("bytes=0-"),
            Some(ByteRange::From { start: 0, end: None })
        );
        assert_eq!(ByteRange::parse("bytes=-300"), Some(ByteRange::Suffix(300)));
        assert_eq!(
            ByteRange::parse(" bytes= 7 - 9 "),
            Some(ByteRange::From { start: 7, end: Some(9) })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(ByteRange::parse("bytes=0-10,20-30"), None);
        assert_eq!(ByteRange::parse("items=0-10"), None);
        assert_eq!(ByteRange::parse("bytes=a-b"), None);
        assert_eq!(ByteRange::parse("bytes=10"), None);
        assert_eq!(ByteRange::parse("bytes=-"), None);
        assert_eq!(ByteRange::parse(""), None);
    }

    #[test]
    fn test_resolve_clips_end() {
        let range = ByteRange::From { start: 5, end: Some(500) };
        assert_eq!(range.resolve(0, 20), Some((5, 19)));
    }

    #[test]
    fn test_resolve_rejects_out_of_bounds() {
        assert_eq!(ByteRange::From { start: 20, end: None }.resolve(0, 20), None);
        assert_eq!(ByteRange::From { start: 9, end: Some(3) }.resolve(0, 20), None);
        assert_eq!(ByteRange::From { start: 0, end: None }.resolve(0, 0), None);
    }

    #[test]
    fn test_resolve_rejects_evicted_start() {
        let range = ByteRange::From { start: 3, end: Some(12) };
        assert_eq!(range.resolve(10, 30), None);
        assert_eq!(range.resolve(3, 30), Some((3, 12)));
    }

    #[test]
    fn test_suffix_is_bounded_by_floor() {
        assert_eq!(ByteRange::Suffix(5).resolve(0, 20), Some((15, 19)));
        assert_eq!(ByteRange::Suffix(100).resolve(8, 20), Some((8, 19)));
        assert_eq!(ByteRange::Suffix(0).resolve(0, 20), None);
    }

    #[test]
    fn test_not_satisfiable_response() {
        let response = LogfileError::RangeNotSatisfiable { total: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */42");
    }

    #[test]
    fn test_partial_slice_headers() {
        let slice = LogSlice {
            body: b"world".to_vec(),
            range: Some((6, 10)),
            total: 11,
        };
        let response = slice.into_response();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 6-10/11");
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
    }
}
