//! AutomationDriver - Abstract Browser Automation Capability
//!
//! Everything above this trait (waits, interactions, pages, the orchestrator)
//! is written against `dyn AutomationDriver`, so the same suite runs on a real
//! Chromium session or on the in-memory [`MockDriver`](crate::MockDriver).
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  AutomationDriver (capability trait)                      │
//! ├───────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐     ┌─────────────────────────┐  │
//! │  │  ChromiumDriver     │     │  MockDriver             │  │
//! │  │  (feature browser)  │     │  (in-memory site)       │  │
//! │  │  CDP via            │     │  deterministic, records │  │
//! │  │  chromiumoxide      │     │  every call             │  │
//! │  └─────────────────────┘     └─────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```

use crate::locator::Locator;
use crate::result::ProbeResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scripts injected through [`AutomationDriver::execute_script`].
///
/// Scripts follow the WebDriver convention: a function body that receives
/// element arguments as `arguments[n]`.
pub mod scripts {
    /// Current `document.readyState`
    pub const READY_STATE: &str = "return document.readyState;";
    /// Click through the DOM, bypassing native input dispatch
    pub const CLICK: &str = "arguments[0].click(); return true;";
}

/// Live reference to an element found on the current page.
///
/// Valid until the next navigation; using it afterwards yields
/// `ElementNotFound`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-scoped element identifier
    pub id: String,
    /// Lower-case tag name
    pub tag_name: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
        }
    }
}

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie path
    pub path: Option<String>,
}

impl Cookie {
    /// Create a cookie scoped to the whole site
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: Some("/".to_string()),
        }
    }
}

/// Browser configuration for drivers that launch a real browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Disable the Chromium sandbox (containers)
    pub no_sandbox: bool,
    /// Executable path override
    pub executable_path: Option<PathBuf>,
    /// Timeout for a single navigation
    #[serde(with = "duration_ms")]
    pub navigation_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            no_sandbox: false,
            executable_path: None,
            navigation_timeout: Duration::from_secs(30),
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set executable path
    #[must_use]
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Capability every browser backend provides.
///
/// All methods are blocking: the suite runs one case at a time on one thread
/// and the wait engine is the only place that sleeps.
pub trait AutomationDriver: std::fmt::Debug {
    /// Navigate to URL
    fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Current URL
    fn current_url(&self) -> ProbeResult<String>;

    /// Current document title
    fn title(&self) -> ProbeResult<String>;

    /// First element matching the locator, if any
    fn find_element(&self, locator: &Locator) -> ProbeResult<Option<ElementHandle>>;

    /// Attribute value of an element
    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>>;

    /// Rendered text of an element
    fn text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Current form value of an input or textarea
    fn value(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Checked/selected state of a checkbox, radio or option
    fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Native click; fails with `Interactable` when the click is intercepted
    fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Clear the value of an input
    fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type text into an element
    fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Attach a local file to a file input
    fn set_file(&self, element: &ElementHandle, path: &Path) -> ProbeResult<()>;

    /// Move the pointer over an element
    fn hover(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Drag one element onto another
    fn drag_and_drop(&self, source: &ElementHandle, target: &ElementHandle) -> ProbeResult<()>;

    /// Execute an injected script with element arguments
    fn execute_script(
        &self,
        script: &str,
        args: &[ElementHandle],
    ) -> ProbeResult<serde_json::Value>;

    /// Cookies visible to the current page
    fn cookies(&self) -> ProbeResult<Vec<Cookie>>;

    /// Add a cookie for the current page
    fn add_cookie(&self, cookie: &Cookie) -> ProbeResult<()>;

    /// Delete a cookie by name
    fn delete_cookie(&self, name: &str) -> ProbeResult<()>;

    /// Delete all cookies
    fn delete_all_cookies(&self) -> ProbeResult<()>;

    /// Go back in history
    fn back(&self) -> ProbeResult<()>;

    /// Go forward in history
    fn forward(&self) -> ProbeResult<()>;

    /// Reload page
    fn refresh(&self) -> ProbeResult<()>;

    /// End the session and close the browser
    fn quit(&self) -> ProbeResult<()>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_element_handle_creation() {
            let elem = ElementHandle::new("el-1", "button");
            assert_eq!(elem.id, "el-1");
            assert_eq!(elem.tag_name, "button");
        }
    }

    mod cookie_tests {
        use super::*;

        #[test]
        fn test_cookie_defaults_to_root_path() {
            let cookie = Cookie::new("testCookie", "testValue");
            assert_eq!(cookie.path.as_deref(), Some("/"));
        }
    }

    mod driver_config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert_eq!(config.viewport_width, 1920);
            assert_eq!(config.viewport_height, 1080);
            assert!(config.executable_path.is_none());
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .headless(false)
                .viewport(800, 600)
                .executable("/usr/bin/chromium");
            assert!(!config.headless);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(
                config.executable_path,
                Some(PathBuf::from("/usr/bin/chromium"))
            );
        }

        #[test]
        fn test_config_yaml_uses_milliseconds() {
            let config: DriverConfig =
                serde_yaml_ng::from_str("headless: false\nnavigation_timeout: 1500\n").unwrap();
            assert!(!config.headless);
            assert_eq!(config.navigation_timeout, Duration::from_millis(1500));
            assert_eq!(config.viewport_width, 1920);
        }
    }
}
