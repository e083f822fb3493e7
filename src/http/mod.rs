//! HTTP hosting.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, request span)
//!     → httptrace layer (timestamp, snapshot)
//!     → timeout
//!     → host routes | actuator endpoints
//!     → httptrace layer (record) → client
//! ```

pub mod server;

pub use server::HttpServer;
