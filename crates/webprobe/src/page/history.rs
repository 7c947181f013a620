use super::{PageBase, PageObject};
use crate::result::ProbeResult;

/// Two pages used to exercise the session's navigation stack
#[derive(Debug, Clone)]
pub struct HistoryPage<'d> {
    base: PageBase<'d>,
}

impl HistoryPage<'_> {
    /// First page of the pair
    pub const FIRST_PATH: &'static str = "/test/newtours/index.php";
    /// Second page of the pair
    pub const SECOND_PATH: &'static str = "/test/newtours/register.php";

    /// Navigate to the first page
    pub fn visit_first(&self) -> ProbeResult<()> {
        self.base.ui().open_url(&self.base.url_for(Self::FIRST_PATH))
    }

    /// Navigate to the second page
    pub fn visit_second(&self) -> ProbeResult<()> {
        self.base.ui().open_url(&self.base.url_for(Self::SECOND_PATH))
    }

    /// History back
    pub fn go_back(&self) -> ProbeResult<()> {
        self.base.ui().back()
    }

    /// History forward
    pub fn go_forward(&self) -> ProbeResult<()> {
        self.base.ui().forward()
    }

    /// Reload; the stack position is unchanged
    pub fn refresh(&self) -> ProbeResult<()> {
        self.base.ui().refresh()
    }

    /// Whether the session is on the first page
    pub fn is_on_first(&self) -> ProbeResult<bool> {
        self.is_on(Self::FIRST_PATH)
    }

    /// Whether the session is on the second page
    pub fn is_on_second(&self) -> ProbeResult<bool> {
        self.is_on(Self::SECOND_PATH)
    }

    fn is_on(&self, path: &str) -> ProbeResult<bool> {
        let url = self.base.ui().current_url()?;
        let expected = self.base.url_for(path);
        Ok(url == expected || url.starts_with(&format!("{expected}?")))
    }
}

impl<'d> PageObject<'d> for HistoryPage<'d> {
    fn new(base: PageBase<'d>) -> Self {
        Self { base }
    }

    fn base(&self) -> &PageBase<'d> {
        &self.base
    }

    fn path(&self) -> &'static str {
        Self::FIRST_PATH
    }

    fn name(&self) -> &'static str {
        "history"
    }
}
