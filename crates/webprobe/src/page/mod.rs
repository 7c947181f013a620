//! Page Object Model
//!
//! One type per page or feature area. A page owns its locators and exposes a
//! few high-level operations built only from [`Interactor`] calls; pages never
//! call each other.
//!
//! Sub-operation errors propagate unchanged. Operations documented as
//! structural checks (`is_on_login_page`, `is_logged_in`, ...) answer `false`
//! when their marker element is absent.

mod cookies;
mod drag_drop;
mod form;
mod history;
mod home;
mod hover;
mod login;
mod menu;
mod registration;
mod textarea;
mod upload;

pub use cookies::{CookieJar, CONSENT_COOKIE};
pub use drag_drop::DragDropPage;
pub use form::{FormPage, CHOICE_COUNT};
pub use history::HistoryPage;
pub use home::HomePage;
pub use hover::HoverPage;
pub use login::LoginPage;
pub use menu::MenuPage;
pub use registration::RegistrationPage;
pub use textarea::TextareaPage;
pub use upload::UploadPage;

use crate::interaction::Interactor;
use crate::result::ProbeResult;

/// State shared by every page object: the session and the site root
#[derive(Debug, Clone)]
pub struct PageBase<'d> {
    interactor: Interactor<'d>,
    base_url: String,
}

impl<'d> PageBase<'d> {
    /// Create a page base; a trailing `/` on `base_url` is ignored
    #[must_use]
    pub fn new(interactor: Interactor<'d>, base_url: &str) -> Self {
        Self {
            interactor,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Interaction facade
    #[must_use]
    pub const fn ui(&self) -> &Interactor<'d> {
        &self.interactor
    }

    /// Site root without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a site path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Trait for page objects representing a page or feature area.
///
/// # Example
///
/// ```ignore
/// let login = LoginPage::new(PageBase::new(Interactor::new(&driver), base_url));
/// login.open()?;
/// login.log_in("u1@example.com", "Password123")?;
/// ```
pub trait PageObject<'d> {
    /// Construct against a session
    fn new(base: PageBase<'d>) -> Self
    where
        Self: Sized;

    /// Shared page state
    fn base(&self) -> &PageBase<'d>;

    /// Site path of the page, starting with `/`
    fn path(&self) -> &'static str;

    /// Page name for logging
    fn name(&self) -> &'static str;

    /// Absolute URL
    fn url(&self) -> String {
        self.base().url_for(self.path())
    }

    /// Navigate to the page and wait until it has loaded
    fn open(&self) -> ProbeResult<()> {
        tracing::debug!(page = self.name(), "open");
        self.base().ui().open_url(&self.url())
    }

    /// Whether the session is currently on this page
    fn is_loaded(&self) -> ProbeResult<bool> {
        Ok(self.base().ui().current_url()?.starts_with(&self.url()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;

    #[test]
    fn test_base_url_trailing_slash_is_ignored() {
        let driver = MockDriver::new();
        let base = PageBase::new(Interactor::new(&driver), "https://demo.test/");
        assert_eq!(base.base_url(), "https://demo.test");
        assert_eq!(base.url_for("/test/login.html"), "https://demo.test/test/login.html");
    }

    #[test]
    fn test_is_loaded_compares_current_url() {
        let driver = MockDriver::new();
        let page = LoginPage::new(PageBase::new(Interactor::new(&driver), "https://demo.test"));
        assert!(!page.is_loaded().unwrap());
        page.open().unwrap();
        assert!(page.is_loaded().unwrap());
        assert_eq!(page.name(), "login");
    }
}
