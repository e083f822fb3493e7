//! Trace records for completed HTTP exchanges.
//!
//! Serialized in the Spring Boot Admin v2 `httptrace` shape: camelCase
//! fields, ISO-8601 timestamps, multi-valued header maps.

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, Request, Response, StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Header name → values in the order the transport delivered them.
pub type HeaderMultiMap = BTreeMap<String, Vec<String>>;

/// Collect a `HeaderMap` into a multi-valued map. Non UTF-8 values are decoded lossily.
pub fn header_multimap(headers: &HeaderMap) -> HeaderMultiMap {
    let mut map = HeaderMultiMap::new();
    for (name, value) in headers.iter() {
        map.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}

/// Request capabilities needed to build a trace record.
///
/// Implemented for `http::Request`; other transports implement it to feed
/// the same recorder.
pub trait TraceableRequest {
    fn trace_method(&self) -> String;
    fn trace_url(&self) -> String;
    fn trace_headers(&self) -> HeaderMultiMap;
}

/// Response capabilities needed to build a trace record.
pub trait TraceableResponse {
    fn trace_status(&self) -> u16;
    fn trace_headers(&self) -> HeaderMultiMap;
}

impl<B> TraceableRequest for Request<B> {
    fn trace_method(&self) -> String {
        self.method().to_string()
    }

    fn trace_url(&self) -> String {
        let uri = self.uri();
        if uri.authority().is_some() {
            return uri.to_string();
        }
        let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        match self.headers().get(header::HOST).and_then(|h| h.to_str().ok()) {
            Some(host) => format!("http://{}{}", host, path),
            None => path.to_string(),
        }
    }

    fn trace_headers(&self) -> HeaderMultiMap {
        header_multimap(self.headers())
    }
}

impl<B> TraceableResponse for Response<B> {
    fn trace_status(&self) -> u16 {
        self.status().as_u16()
    }

    fn trace_headers(&self) -> HeaderMultiMap {
        header_multimap(self.headers())
    }
}

/// Request half of a trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRequest {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMultiMap,
}

impl TraceRequest {
    pub fn capture<R: TraceableRequest + ?Sized>(request: &R) -> Self {
        Self {
            method: request.trace_method(),
            uri: request.trace_url(),
            headers: request.trace_headers(),
        }
    }
}

/// Response half of a trace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceResponse {
    pub status: u16,
    pub headers: HeaderMultiMap,
}

impl TraceResponse {
    pub fn capture<R: TraceableResponse + ?Sized>(response: &R) -> Self {
        Self {
            status: response.trace_status(),
            headers: response.trace_headers(),
        }
    }

    /// Stand-in for a handler that failed without producing a response.
    pub fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            headers: HeaderMultiMap::new(),
        }
    }
}

/// One completed HTTP exchange. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRecord {
    /// When the request started processing.
    pub timestamp: DateTime<Utc>,
    pub principal: Option<String>,
    pub session: Option<String>,
    pub request: TraceRequest,
    pub response: TraceResponse,
    /// Whole milliseconds between request start and response completion.
    pub time_taken: u64,
}

impl TraceRecord {
    pub fn new(
        request: TraceRequest,
        response: TraceResponse,
        request_time: DateTime<Utc>,
        response_time: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: request_time,
            principal: None,
            session: None,
            request,
            response,
            time_taken: elapsed_millis(request_time, response_time),
        }
    }
}

/// Milliseconds from `start` to `end`, truncated and clamped at zero.
pub fn elapsed_millis(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from((end - start).num_milliseconds()).unwrap_or(0)
}

/// Body of the `/httptrace` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HttpTraces {
    pub traces: Vec<TraceRecord>,
}
