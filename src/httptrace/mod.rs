//! HTTP trace recording subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → layer.rs (timestamp, snapshot request)
//!     → host handler / actuator endpoint
//!     → layer.rs (snapshot response, build TraceRecord)
//!     → buffer.rs (bounded FIFO, oldest evicted)
//!     → GET {prefix}/httptrace
//! ```
//!
//! # Design Decisions
//! - Records are immutable after insertion
//! - Readers get a copy; inserts never disturb an iteration in progress
//! - Record building depends only on the capability traits in record.rs

pub mod buffer;
pub mod layer;
pub mod record;

pub use buffer::TraceRingBuffer;
pub use layer::{HttpTraceLayer, HttpTraceService, ACTUATOR_CONTENT_TYPE};
pub use record::{
    HeaderMultiMap, HttpTraces, TraceRecord, TraceRequest, TraceResponse, TraceableRequest,
    TraceableResponse,
};
