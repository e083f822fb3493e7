//! Self-registration with a monitoring registry.
//!
//! # Data Flow
//! ```text
//! PeriodicTask tick (own tokio task)
//!     → payload.rs (fresh RegistrationRequest)
//!     → client.rs (POST registry_url)
//!     → state.rs (Registered / failure count)
//!
//! stop()
//!     → join in-flight tick → Stopped → optional DELETE registry_url/{id}
//! ```

pub mod client;
pub mod payload;
pub mod state;

pub use client::{RegistrationClient, RegistrationError};
pub use payload::{RegistrationRequest, RegistrationResponse, RegistrationSettings};
pub use state::{Outcome, RegistrationState, RegistrationStatus};
