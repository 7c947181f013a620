use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;
use tracing::info;

/// Landing page after a successful login
#[derive(Debug, Clone)]
pub struct HomePage<'d> {
    base: PageBase<'d>,
}

impl HomePage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/account.html";

    /// Label showing the signed-in email; only rendered for a signed-in user
    #[must_use]
    pub fn identity_label() -> Locator {
        Locator::id("logged-in-user").described("signed-in user")
    }

    /// Sign-out link
    #[must_use]
    pub fn log_out_link() -> Locator {
        Locator::link_text("Sign out").described("sign-out link")
    }

    /// Structural check: the identity label is present
    pub fn is_logged_in(&self) -> ProbeResult<bool> {
        self.base.ui().is_displayed(&Self::identity_label())
    }

    /// Email of the signed-in user
    pub fn logged_in_identity(&self) -> ProbeResult<String> {
        self.base.ui().read_text(&Self::identity_label())
    }

    /// Sign out and wait for the resulting page
    pub fn log_out(&self) -> ProbeResult<()> {
        info!("logging out");
        let ui = self.base.ui();
        ui.click_robust(&Self::log_out_link())?;
        ui.waiter().wait_for_document_ready()
    }
}

impl<'d> PageObject<'d> for HomePage<'d> {
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
        "home"
    }
}
