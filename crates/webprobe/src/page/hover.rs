use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;

/// Download button that shows a tooltip on hover
#[derive(Debug, Clone)]
pub struct HoverPage<'d> {
    base: PageBase<'d>,
}

impl HoverPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/tooltip.html";

    /// The download button
    #[must_use]
    pub fn download_button() -> Locator {
        Locator::id("download_now").described("download button")
    }

    /// Tooltip rendered next to the button
    #[must_use]
    pub fn tooltip() -> Locator {
        Locator::css(".tooltip").described("download tooltip")
    }

    /// Structural check: the button is present
    pub fn has_download_button(&self) -> ProbeResult<bool> {
        self.base.ui().is_present(&Self::download_button())
    }

    /// Move the pointer over the button
    pub fn hover_download_button(&self) -> ProbeResult<()> {
        self.base.ui().hover(&Self::download_button())
    }

    /// Structural check: the tooltip is rendered right now
    pub fn is_tooltip_visible(&self) -> ProbeResult<bool> {
        self.base.ui().is_displayed(&Self::tooltip())
    }

    /// Tooltip text, waiting for it to render
    pub fn tooltip_text(&self) -> ProbeResult<String> {
        self.base.ui().read_text(&Self::tooltip())
    }
}

impl<'d> PageObject<'d> for HoverPage<'d> {
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
        "hover"
    }
}
