//! Artifacts one case produces and later cases consume.
//!
//! A [`SharedTestState`] lives for exactly one suite run. The orchestrator
//! owns it and lends it `&mut` to the running case, so there is no global
//! state and no locking.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A completion flag a case can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// An account was registered and its credentials recorded
    Registration,
    /// The registered account logged in successfully
    Login,
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Registration => "registration",
            Self::Login => "login",
        })
    }
}

/// Per-run record of cross-case artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SharedTestState {
    registered_email: Option<String>,
    #[serde(skip)]
    registered_password: Option<String>,
    registration_completed: bool,
    login_completed: bool,
}

impl SharedTestState {
    /// Empty state for a new run
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed registration
    pub fn record_registration(&mut self, email: impl Into<String>, password: impl Into<String>) {
        let email = email.into();
        info!(email = %email, "registration recorded");
        self.registered_email = Some(email);
        self.registered_password = Some(password.into());
        self.registration_completed = true;
    }

    /// Record a completed login.
    ///
    /// # Errors
    ///
    /// `DependencyUnmet` if no registration was recorded first.
    pub fn record_login(&mut self, by_case: &str) -> ProbeResult<()> {
        if !self.registration_completed {
            return Err(ProbeError::DependencyUnmet {
                dependency: format!("{} (required by {by_case})", Milestone::Registration),
            });
        }
        info!(case = by_case, "login recorded");
        self.login_completed = true;
        Ok(())
    }

    /// Whether `milestone` has been reached
    #[must_use]
    pub const fn is_complete(&self, milestone: Milestone) -> bool {
        match milestone {
            Milestone::Registration => self.registration_completed,
            Milestone::Login => self.login_completed,
        }
    }

    /// Registered email
    #[must_use]
    pub fn registered_email(&self) -> Option<&str> {
        self.registered_email.as_deref()
    }

    /// Registered password
    #[must_use]
    pub fn registered_password(&self) -> Option<&str> {
        self.registered_password.as_deref()
    }

    /// Registered `(email, password)`; `AssertionFailed` when absent
    pub fn credentials(&self) -> ProbeResult<(&str, &str)> {
        match (self.registered_email(), self.registered_password()) {
            (Some(email), Some(password)) if self.registration_completed => Ok((email, password)),
            _ => Err(ProbeError::assertion(format!(
                "no credentials recorded for {}",
                Milestone::Registration
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;

    #[test]
    fn test_new_state_is_empty() {
        let state = SharedTestState::new();
        assert!(!state.is_complete(Milestone::Registration));
        assert!(!state.is_complete(Milestone::Login));
        assert!(state.registered_email().is_none());
        assert!(state.credentials().is_err());
    }

    #[test]
    fn test_missing_credentials_is_an_assertion_failure() {
        let err = SharedTestState::new().credentials().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AssertionFailed);
        assert!(err.related_dependency().is_none());
    }

    #[test]
    fn test_registration_sets_credentials() {
        let mut state = SharedTestState::new();
        state.record_registration("u1@example.com", "Password123");
        assert!(state.is_complete(Milestone::Registration));
        assert_eq!(state.credentials().unwrap(), ("u1@example.com", "Password123"));
    }

    #[test]
    fn test_login_requires_registration() {
        let mut state = SharedTestState::new();
        let err = state.record_login("c_valid_login").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyUnmet);
        assert!(!state.is_complete(Milestone::Login));

        state.record_registration("u1@example.com", "pw");
        state.record_login("c_valid_login").unwrap();
        assert!(state.is_complete(Milestone::Login));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let mut state = SharedTestState::new();
        state.record_registration("u1@example.com", "secret");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("u1@example.com"));
        assert!(!json.contains("secret"));
    }
}
