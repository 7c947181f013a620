//! Result and error types for Webprobe.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Webprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving a page or running a suite
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No element matched the locator within the timeout
    #[error("Element not found: {locator} (waited {waited_ms}ms)")]
    ElementNotFound {
        /// Locator description
        locator: String,
        /// Time spent waiting
        waited_ms: u64,
    },

    /// A condition was evaluated but never reached the wanted state
    #[error("Timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Condition description
        condition: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element exists but cannot be operated
    #[error("Element {locator} is not interactable: {message}")]
    Interactable {
        /// Locator description
        locator: String,
        /// Error message
        message: String,
    },

    /// A declared upstream case has not completed
    #[error("Dependency {dependency} has not completed successfully")]
    DependencyUnmet {
        /// Identifier of the upstream case
        dependency: String,
    },

    /// A test-body check did not hold
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// The case decided it cannot run in this environment
    #[error("Skipped: {reason}")]
    Skipped {
        /// Why the case was skipped
        reason: String,
    },

    /// The automation driver reported an error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// No browser session could be created
    #[error("Session unavailable: {message}")]
    SessionUnavailable {
        /// Error message
        message: String,
    },

    /// Caller passed an argument the operation does not accept
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// The suite definition is inconsistent
    #[error("Invalid suite: {message}")]
    InvalidSuite {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Error classification used in suite reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ProbeError::ElementNotFound`]
    ElementNotFound,
    /// See [`ProbeError::Timeout`]
    Timeout,
    /// See [`ProbeError::Interactable`]
    Interactable,
    /// See [`ProbeError::DependencyUnmet`]
    DependencyUnmet,
    /// See [`ProbeError::AssertionFailed`]
    AssertionFailed,
    /// See [`ProbeError::Skipped`]
    Skipped,
    /// Driver, session, I/O and serialization failures
    Environment,
    /// Invalid arguments, suite or configuration
    Usage,
}

impl ErrorKind {
    /// Stable name used in text output
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ElementNotFound => "ElementNotFound",
            Self::Timeout => "Timeout",
            Self::Interactable => "Interactable",
            Self::DependencyUnmet => "DependencyUnmet",
            Self::AssertionFailed => "AssertionFailed",
            Self::Skipped => "Skipped",
            Self::Environment => "Environment",
            Self::Usage => "Usage",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProbeError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a skip outcome
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an invalid suite error
    #[must_use]
    pub fn invalid_suite(message: impl Into<String>) -> Self {
        Self::InvalidSuite {
            message: message.into(),
        }
    }

    /// Classify the error for reporting
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ElementNotFound { .. } => ErrorKind::ElementNotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Interactable { .. } => ErrorKind::Interactable,
            Self::DependencyUnmet { .. } => ErrorKind::DependencyUnmet,
            Self::AssertionFailed { .. } => ErrorKind::AssertionFailed,
            Self::Skipped { .. } => ErrorKind::Skipped,
            Self::Driver { .. }
            | Self::SessionUnavailable { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::Environment,
            Self::InvalidArgument { .. } | Self::InvalidSuite { .. } | Self::Config { .. } => {
                ErrorKind::Usage
            }
        }
    }

    /// Errors a best-effort interaction is allowed to turn into a skip
    #[must_use]
    pub const fn is_interaction_failure(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::Timeout { .. } | Self::Interactable { .. }
        )
    }

    /// Upstream case named by a dependency failure
    #[must_use]
    pub fn related_dependency(&self) -> Option<&str> {
        match self {
            Self::DependencyUnmet { dependency } => Some(dependency),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct_for_interaction_errors() {
        let not_found = ProbeError::ElementNotFound {
            locator: "#email".into(),
            waited_ms: 100,
        };
        let timeout = ProbeError::Timeout {
            condition: "element clickable".into(),
            ms: 100,
        };
        let blocked = ProbeError::Interactable {
            locator: "#submit".into(),
            message: "click intercepted".into(),
        };
        assert_eq!(not_found.kind(), ErrorKind::ElementNotFound);
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(blocked.kind(), ErrorKind::Interactable);
        assert!(not_found.is_interaction_failure());
        assert!(timeout.is_interaction_failure());
        assert!(blocked.is_interaction_failure());
    }

    #[test]
    fn test_dependency_error_names_upstream() {
        let err = ProbeError::DependencyUnmet {
            dependency: "a1_user_registration".into(),
        };
        assert_eq!(err.kind(), ErrorKind::DependencyUnmet);
        assert_eq!(err.related_dependency(), Some("a1_user_registration"));
        assert!(err.to_string().contains("a1_user_registration"));
        assert!(!err.is_interaction_failure());
    }

    #[test]
    fn test_assertion_and_skip_helpers() {
        assert_eq!(
            ProbeError::assertion("nope").kind(),
            ErrorKind::AssertionFailed
        );
        assert_eq!(ProbeError::skipped("no tooltip").kind(), ErrorKind::Skipped);
        assert!(ProbeError::skipped("no tooltip")
            .to_string()
            .contains("no tooltip"));
    }

    #[test]
    fn test_environment_and_usage_kinds() {
        let io = ProbeError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.kind(), ErrorKind::Environment);
        assert_eq!(ProbeError::driver("cdp").kind(), ErrorKind::Environment);
        assert_eq!(ProbeError::invalid_suite("dup").kind(), ErrorKind::Usage);
        assert_eq!(ProbeError::invalid_argument("4").kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::DependencyUnmet).unwrap();
        assert_eq!(json, "\"dependency_unmet\"");
        assert_eq!(ErrorKind::DependencyUnmet.to_string(), "DependencyUnmet");
    }
}
