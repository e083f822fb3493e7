//! Registration state machine.
//!
//! # States
//! ```text
//! Idle → Registering → Registered ⇄ ReregistrationPending
//!   any → Stopped (terminal)
//! ```
//!
//! # Transitions
//! - Tick starts while `Idle`: `Registering`
//! - 2xx reply: `Registered`, failures reset
//! - Failure with a known registration id: `ReregistrationPending`
//! - Failure before any success: back to `Idle`

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Idle,
    Registering,
    Registered,
    ReregistrationPending,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// Diagnostic snapshot of the heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationState {
    pub status: RegistrationStatus,
    pub registration_id: Option<String>,
    pub last_outcome: Option<Outcome>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub attempts: u64,
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self {
            status: RegistrationStatus::Idle,
            registration_id: None,
            last_outcome: None,
            last_attempt: None,
            consecutive_failures: 0,
            attempts: 0,
        }
    }
}

impl RegistrationState {
    pub fn begin_attempt(&mut self) {
        if self.status == RegistrationStatus::Idle {
            self.status = RegistrationStatus::Registering;
        }
        self.attempts += 1;
        self.last_attempt = Some(Utc::now());
    }

    /// A new id replaces the old one; a reply without id keeps the known one.
    pub fn record_success(&mut self, id: Option<String>) {
        if self.status == RegistrationStatus::Stopped {
            return;
        }
        self.status = RegistrationStatus::Registered;
        if id.is_some() {
            self.registration_id = id;
        }
        self.last_outcome = Some(Outcome::Success);
        self.consecutive_failures = 0;
    }

    /// Returns the updated consecutive failure count.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.last_outcome = Some(Outcome::Failure);
        if self.status != RegistrationStatus::Stopped {
            self.status = if self.registration_id.is_some() {
                RegistrationStatus::ReregistrationPending
            } else {
                RegistrationStatus::Idle
            };
        }
        self.consecutive_failures
    }

    pub fn is_registered(&self) -> bool {
        self.status == RegistrationStatus::Registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_returns_to_idle() {
        let mut state = RegistrationState::default();
        state.begin_attempt();
        assert_eq!(state.status, RegistrationStatus::Registering);
        assert_eq!(state.record_failure(), 1);
        assert_eq!(state.status, RegistrationStatus::Idle);
        assert_eq!(state.last_outcome, Some(Outcome::Failure));
    }

    #[test]
    fn test_registered_and_pending_alternate() {
        let mut state = RegistrationState::default();
        state.begin_attempt();
        state.record_success(Some("abc".to_string()));
        assert!(state.is_registered());

        state.begin_attempt();
        state.record_failure();
        state.begin_attempt();
        assert_eq!(state.record_failure(), 2);
        assert_eq!(state.status, RegistrationStatus::ReregistrationPending);

        state.begin_attempt();
        state.record_success(None);
        assert!(state.is_registered());
        assert_eq!(state.registration_id.as_deref(), Some("abc"));
        assert_eq!(state.consecutive_failures, 0);
        assert_eq!(state.attempts, 4);
    }

    #[test]
    fn test_stopped_is_terminal() {
        let mut state = RegistrationState {
            status: RegistrationStatus::Stopped,
            ..Default::default()
        };
        state.record_success(Some("late".to_string()));
        state.record_failure();
        assert_eq!(state.status, RegistrationStatus::Stopped);
    }
}
