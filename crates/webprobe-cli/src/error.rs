//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Webprobe library error
    #[error("Webprobe error: {0}")]
    Probe(#[from] webprobe::ProbeError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert!(CliError::config("bad yaml").to_string().contains("bad yaml"));
        let err = CliError::invalid_argument("--mock and --headed");
        assert!(err.to_string().starts_with("Invalid argument"));
    }

    #[test]
    fn test_from_probe_error() {
        let err: CliError = webprobe::ProbeError::invalid_suite("dup").into();
        assert!(matches!(err, CliError::Probe(_)));
    }
}
