//! Range-addressable log tail subsystem.
//!
//! # Data Flow
//! ```text
//! tracing events (host application)
//!     → fmt layer → writer.rs (MakeWriter)
//!     → buffer.rs (bounded, absolute byte offsets)
//!
//! GET {prefix}/logfile [Range: bytes=...]
//!     → range.rs (parse, resolve against retained window)
//!     → 200 full / 206 partial / 416 not satisfiable
//! ```
//!
//! # Design Decisions
//! - Offsets count every byte ever written, so pollers can ask for
//!   "everything after offset N" across trims
//! - Ranges starting below the retained floor are rejected, never clamped
//! - Only a single range per request is served

pub mod buffer;
pub mod range;
pub mod writer;

pub use buffer::LogBuffer;
pub use range::{ByteRange, LogSlice, LogfileError};
pub use writer::LogBufferWriter;
