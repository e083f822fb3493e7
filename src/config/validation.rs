//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities, intervals > 0)
//! - Validate URLs and the endpoint prefix
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ActuatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ActuatorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ActuatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.app.name.trim().is_empty() {
        errors.push(ValidationError::new("app.name", "must not be empty"));
    }
    check_url(&mut errors, "app.service_url", &config.app.service_url);
    if let Some(url) = &config.app.management_url {
        check_url(&mut errors, "app.management_url", url);
    }

    let prefix = &config.endpoints.path_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::new(
            "endpoints.path_prefix",
            format!("'{}' must start with '/' and name a path segment", prefix),
        ));
    } else if prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "endpoints.path_prefix",
            format!("'{}' must not end with '/'", prefix),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be > 0"));
    }
    if config.httptrace.capacity == 0 {
        errors.push(ValidationError::new("httptrace.capacity", "must be > 0"));
    }
    if config.logfile.max_bytes == 0 {
        errors.push(ValidationError::new("logfile.max_bytes", "must be > 0"));
    }

    let registration = &config.registration;
    if registration.interval_secs == 0 {
        errors.push(ValidationError::new("registration.interval_secs", "must be > 0"));
    }
    if registration.timeout_secs == 0 {
        errors.push(ValidationError::new("registration.timeout_secs", "must be > 0"));
    }
    match &registration.registry_url {
        Some(url) => check_url(&mut errors, "registration.registry_url", url),
        None if registration.enabled => errors.push(ValidationError::new(
            "registration.registry_url",
            "required when registration is enabled",
        )),
        None => {}
    }
    if registration.password.is_some() && registration.username.is_none() {
        errors.push(ValidationError::new(
            "registration.username",
            "required when a password is set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            field,
            format!("invalid URL '{}': {}", value, e),
        )),
    }
}
