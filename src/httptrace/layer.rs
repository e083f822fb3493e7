//! Tower middleware that records every request/response exchange.
//!
//! # Responsibilities
//! - Timestamp the request as soon as the service is called
//! - Snapshot request method, URL and headers before the handler consumes it
//! - Stamp the actuator content type on the actuator's own JSON endpoints
//! - Record a `TraceRecord` on every exit path (response, error, panic)
//!
//! # Design Decisions
//! - One layer instance per server; all state lives in the shared buffer
//! - Recording is an in-memory push, never an await on I/O
//! - Tracing fails open: nothing here can turn a response into an error

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{header, HeaderValue, Request, Response};
use chrono::{TimeDelta, Utc};
use futures_util::FutureExt;
use tower::{Layer, Service};

use crate::config::TraceScope;
use crate::httptrace::buffer::TraceRingBuffer;
use crate::httptrace::record::{TraceRecord, TraceRequest, TraceResponse};

/// Content type served by the actuator JSON endpoints.
pub const ACTUATOR_CONTENT_TYPE: &str = "application/vnd.spring-boot.actuator.v2+json;charset=UTF-8";

/// Layer producing [`HttpTraceService`]s that feed a shared [`TraceRingBuffer`].
#[derive(Debug, Clone)]
pub struct HttpTraceLayer {
    buffer: Arc<TraceRingBuffer>,
    prefix: Arc<str>,
    scope: TraceScope,
}

impl HttpTraceLayer {
    /// `prefix` is the mount point of the actuator endpoints (e.g. `/pyctuator`).
    pub fn new(buffer: Arc<TraceRingBuffer>, prefix: &str, scope: TraceScope) -> Self {
        Self {
            buffer,
            prefix: Arc::from(prefix.trim_end_matches('/')),
            scope,
        }
    }
}

impl<S> Layer<S> for HttpTraceLayer {
    type Service = HttpTraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpTraceService {
            inner,
            buffer: self.buffer.clone(),
            prefix: self.prefix.clone(),
            scope: self.scope,
        }
    }
}

/// Service wrapper created by [`HttpTraceLayer`].
#[derive(Debug, Clone)]
pub struct HttpTraceService<S> {
    inner: S,
    buffer: Arc<TraceRingBuffer>,
    prefix: Arc<str>,
    scope: TraceScope,
}

/// How the actuator relates to a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Host,
    Actuator,
    Logfile,
}

fn classify(prefix: &str, path: &str) -> Endpoint {
    let Some(rest) = path.strip_prefix(prefix) else {
        return Endpoint::Host;
    };
    match rest {
        "" | "/" => Endpoint::Actuator,
        "/logfile" => Endpoint::Logfile,
        _ if rest.starts_with('/') => Endpoint::Actuator,
        _ => Endpoint::Host,
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HttpTraceService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let request_time = Utc::now();
        let started = Instant::now();

        let endpoint = classify(&self.prefix, request.uri().path());
        let traced = endpoint != Endpoint::Host || self.scope == TraceScope::All;
        let captured = traced.then(|| TraceRequest::capture(&request));

        let future = self.inner.call(request);
        let buffer = self.buffer.clone();

        Box::pin(async move {
            let outcome = AssertUnwindSafe(future).catch_unwind().await;
            let response_time =
                request_time + TimeDelta::from_std(started.elapsed()).unwrap_or_else(|_| TimeDelta::zero());
            let record = |response: TraceResponse| {
                if let Some(request) = captured {
                    buffer.add(TraceRecord::new(request, response, request_time, response_time));
                }
            };

            match outcome {
                Ok(Ok(mut response)) => {
                    if endpoint == Endpoint::Actuator {
                        response.headers_mut().insert(
                            header::CONTENT_TYPE,
                            HeaderValue::from_static(ACTUATOR_CONTENT_TYPE),
                        );
                    }
                    record(TraceResponse::capture(&response));
                    Ok(response)
                }
                Ok(Err(err)) => {
                    tracing::debug!("Traced service returned an error");
                    record(TraceResponse::server_error());
                    Err(err)
                }
                Err(panic) => {
                    tracing::warn!("Traced handler panicked");
                    record(TraceResponse::server_error());
                    std::panic::resume_unwind(panic)
                }
            }
        })
    }
}
