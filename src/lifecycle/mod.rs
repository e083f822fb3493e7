//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → build Actuator → start heartbeat → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain → stop heartbeat → exit
//!
//! Background work (periodic.rs):
//!     interval tick → callback → (next tick | stop signal)
//! ```
//!
//! # Design Decisions
//! - Heartbeat stops after the server drains, so the registry sees the
//!   instance until it actually goes away
//! - Stopping a periodic task joins it; nothing runs after stop returns

pub mod periodic;
pub mod shutdown;

pub use periodic::PeriodicTask;
pub use shutdown::Shutdown;
