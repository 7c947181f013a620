use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;
use tracing::info;

/// Sign-in form
#[derive(Debug, Clone)]
pub struct LoginPage<'d> {
    base: PageBase<'d>,
}

impl LoginPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/login.html";

    /// The login form itself; its presence defines "on the login page"
    #[must_use]
    pub fn form() -> Locator {
        Locator::id("login_form").described("login form")
    }

    /// Email input
    #[must_use]
    pub fn email_field() -> Locator {
        Locator::id("email").described("login email")
    }

    /// Password input
    #[must_use]
    pub fn password_field() -> Locator {
        Locator::id("passwd").described("login password")
    }

    /// Submit button
    #[must_use]
    pub fn submit_button() -> Locator {
        Locator::id("SubmitLogin").described("sign-in button")
    }

    /// Label span nested inside the submit button of the login form
    #[must_use]
    pub fn sign_in_label() -> Locator {
        Locator::xpath("//form[@id='login_form']//button[@id='SubmitLogin']/span")
            .described("sign-in button label")
    }

    /// Error banner shown after rejected credentials
    #[must_use]
    pub fn error_banner() -> Locator {
        Locator::id("login-error").described("login error")
    }

    /// Fill and submit the form. Does not check the outcome.
    pub fn log_in(&self, email: &str, password: &str) -> ProbeResult<()> {
        info!(email, "logging in");
        let ui = self.base.ui();
        ui.type_text(&Self::email_field(), email)?;
        ui.type_text(&Self::password_field(), password)?;
        ui.click_robust(&Self::submit_button())?;
        ui.waiter().wait_for_document_ready()
    }

    /// Structural check: the login form is present
    pub fn is_on_login_page(&self) -> ProbeResult<bool> {
        self.base.ui().is_present(&Self::form())
    }

    /// Visible error text after a rejected login, if shown
    pub fn error_message(&self) -> ProbeResult<Option<String>> {
        let ui = self.base.ui();
        if ui.is_displayed(&Self::error_banner())? {
            ui.read_text(&Self::error_banner()).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Text of the submit button label
    pub fn sign_in_button_label(&self) -> ProbeResult<String> {
        self.base.ui().read_text(&Self::sign_in_label())
    }
}

impl<'d> PageObject<'d> for LoginPage<'d> {
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
        "login"
    }
}
