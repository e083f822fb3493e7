//! In-process observability for axum servers.
//!
//! Records recent HTTP exchanges, serves a byte-range addressable tail of the
//! application log, and keeps the application registered with a Spring Boot
//! Admin style monitoring registry.

pub mod actuator;
pub mod config;
pub mod endpoints;
pub mod health;
pub mod http;
pub mod httptrace;
pub mod lifecycle;
pub mod logfile;
pub mod registration;

pub use actuator::Actuator;
pub use config::schema::ActuatorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
