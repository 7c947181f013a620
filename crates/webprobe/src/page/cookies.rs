use super::{PageBase, PageObject};
use crate::driver::Cookie;
use crate::result::ProbeResult;

/// Consent cookie set by the demo's cookie banner
pub const CONSENT_COOKIE: (&str, &str) = ("cookie_consent", "accepted");

/// Cookie demo page and the session's cookie store
#[derive(Debug, Clone)]
pub struct CookieJar<'d> {
    base: PageBase<'d>,
}

impl CookieJar<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/cookie/selenium_aut.php";

    /// Every cookie visible to the current page
    pub fn all(&self) -> ProbeResult<Vec<Cookie>> {
        self.base.ui().cookies()
    }

    /// Add a site-wide cookie
    pub fn add(&self, name: &str, value: &str) -> ProbeResult<()> {
        self.base.ui().add_cookie(&Cookie::new(name, value))
    }

    /// Value of the cookie called `name`
    pub fn value_of(&self, name: &str) -> ProbeResult<Option<String>> {
        Ok(self
            .all()?
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.value))
    }

    /// Accept the cookie banner by setting its consent cookie
    pub fn add_consent_cookie(&self) -> ProbeResult<()> {
        let (name, value) = CONSENT_COOKIE;
        self.add(name, value)
    }

    /// Remove every cookie
    pub fn delete_all(&self) -> ProbeResult<()> {
        self.base.ui().delete_all_cookies()
    }
}

impl<'d> PageObject<'d> for CookieJar<'d> {
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
        "cookies"
    }
}
