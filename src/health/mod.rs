//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! Built-in providers (ping, disk_space.rs) + host-supplied ones (provider.rs)
//!     → registry.rs (unsupported ones dropped at registration)
//!     → aggregate on each GET {prefix}/health
//! ```
//!
//! # Design Decisions
//! - Providers are opaque; their status is serialized, not validated
//! - Capability is checked once, not per request

pub mod disk_space;
pub mod provider;
pub mod registry;

pub use disk_space::DiskSpaceHealthProvider;
pub use provider::{Health, HealthProvider, HealthStatus, PingHealthProvider};
pub use registry::{CompositeHealth, HealthRegistry};
