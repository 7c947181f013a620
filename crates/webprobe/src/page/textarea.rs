use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;

/// Page with a free-text comment box
#[derive(Debug, Clone)]
pub struct TextareaPage<'d> {
    base: PageBase<'d>,
}

impl TextareaPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/textarea.html";

    /// The textarea
    #[must_use]
    pub fn comment_box() -> Locator {
        Locator::id("comments").described("comment textarea")
    }

    /// Replace the textarea content
    pub fn enter_text(&self, text: &str) -> ProbeResult<()> {
        self.base.ui().type_text(&Self::comment_box(), text)
    }

    /// Current textarea content, untrimmed
    pub fn text_content(&self) -> ProbeResult<String> {
        self.base.ui().read_value(&Self::comment_box())
    }
}

impl<'d> PageObject<'d> for TextareaPage<'d> {
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
        "textarea"
    }
}
