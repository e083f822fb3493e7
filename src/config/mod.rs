//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ActuatorConfig (validated, immutable)
//!     → shared via Arc to the actuator subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ActuatorConfig;
pub use schema::AppConfig;
pub use schema::HealthConfig;
pub use schema::HttpTraceConfig;
pub use schema::LogfileConfig;
pub use schema::RegistrationConfig;
pub use schema::TraceScope;
pub use validation::{validate_config, ValidationError};
