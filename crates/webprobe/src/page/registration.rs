use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;
use tracing::info;

/// Account creation form
#[derive(Debug, Clone)]
pub struct RegistrationPage<'d> {
    base: PageBase<'d>,
}

impl RegistrationPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/register.html";

    /// Email input
    #[must_use]
    pub fn email_field() -> Locator {
        Locator::id("reg-email").described("registration email")
    }

    /// Password input
    #[must_use]
    pub fn password_field() -> Locator {
        Locator::id("reg-password").described("registration password")
    }

    /// Password confirmation input
    #[must_use]
    pub fn confirm_field() -> Locator {
        Locator::id("reg-confirm").described("password confirmation")
    }

    /// Submit button
    #[must_use]
    pub fn submit_button() -> Locator {
        Locator::id("register-submit").described("register button")
    }

    /// Fill and submit the form.
    ///
    /// The site then moves to the login page; callers confirm that with a
    /// separate check.
    pub fn register(&self, email: &str, password: &str) -> ProbeResult<()> {
        info!(email, "registering account");
        let ui = self.base.ui();
        ui.type_text(&Self::email_field(), email)?;
        ui.type_text(&Self::password_field(), password)?;
        ui.type_text(&Self::confirm_field(), password)?;
        ui.click_robust(&Self::submit_button())?;
        ui.waiter().wait_for_document_ready()
    }
}

impl<'d> PageObject<'d> for RegistrationPage<'d> {
    fn new(base: PageBase<'d>) -> Self {
        Self { base }
    }

    fn base(&self) -> &PageBase<'d> {
        &self.base
    }

    fn path(&self) -> &'static str {
        Self::PATH
    }

    fn name(&self) -> &'static str {
        "registration"
    }
}
