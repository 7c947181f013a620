//! Suite configuration.
//!
//! Every field has a default, so a YAML file only needs the values it
//! changes:
//!
//! ```yaml
//! base_url: https://demo.guru99.com
//! invalid_email: nobody@example.com
//! invalid_password: wrong
//! wait:
//!   timeout_ms: 5000
//! ```

use crate::driver::DriverConfig;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://demo.guru99.com";

/// Password used for accounts the suite registers
pub const DEFAULT_ACCOUNT_PASSWORD: &str = "Password123";

/// Configuration consumed by the suite; read-only once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Site root
    pub base_url: String,
    /// Deliberately invalid login email
    pub invalid_email: String,
    /// Deliberately invalid login password
    pub invalid_password: String,
    /// Email to register; a fresh `test<millis>@example.com` when unset
    pub account_email: Option<String>,
    /// Password to register
    pub account_password: String,
    /// Timeouts for every wait
    pub wait: WaitOptions,
    /// Browser settings
    pub driver: DriverConfig,
    /// Stop running cases after the first failure
    pub fail_fast: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            invalid_email: "invalid.user@example.com".to_string(),
            invalid_password: "wrongpassword".to_string(),
            account_email: None,
            account_password: DEFAULT_ACCOUNT_PASSWORD.to_string(),
            wait: WaitOptions::default(),
            driver: DriverConfig::default(),
            fail_fast: false,
        }
    }
}

impl SuiteConfig {
    /// Defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse YAML and validate
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file and validate
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ProbeError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::Config {
                message: format!("base_url must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.wait.timeout_ms == 0 {
            return Err(ProbeError::Config {
                message: "wait.timeout_ms must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Set the site root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the account to register
    #[must_use]
    pub fn with_account_email(mut self, email: impl Into<String>) -> Self {
        self.account_email = Some(email.into());
        self
    }

    /// Set wait options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Enable fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Email for the account registered in this run
    #[must_use]
    pub fn account_email(&self) -> String {
        self.account_email.clone().unwrap_or_else(|| {
            format!("test{}@example.com", chrono::Utc::now().timestamp_millis())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.account_password, "Password123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = SuiteConfig::from_yaml_str(
            "base_url: http://localhost:8080\ninvalid_email: x@y.z\nwait:\n  timeout_ms: 2500\n",
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.invalid_email, "x@y.z");
        assert_eq!(config.wait.timeout_ms, 2500);
        assert_eq!(config.wait.poll_interval_ms, 100);
        assert_eq!(config.invalid_password, "wrongpassword");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = SuiteConfig::from_yaml_str("base_url: demo.guru99.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(SuiteConfig::from_yaml_str("wait: [1, 2").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fail_fast: true").unwrap();
        let config = SuiteConfig::load(file.path()).unwrap();
        assert!(config.fail_fast);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = SuiteConfig::load(Path::new("/nonexistent/webprobe.yaml")).unwrap_err();
        assert!(matches!(err, ProbeError::Config { .. }));
    }

    #[test]
    fn test_generated_account_email() {
        let email = SuiteConfig::default().account_email();
        assert!(email.starts_with("test"));
        assert!(email.ends_with("@example.com"));
        let fixed = SuiteConfig::default().with_account_email("u1@example.com");
        assert_eq!(fixed.account_email(), "u1@example.com");
    }
}
