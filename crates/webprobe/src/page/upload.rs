use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;
use std::path::Path;
use tracing::info;

const SUCCESS_MARKER: &str = "successfully uploaded";

/// File upload form
#[derive(Debug, Clone)]
pub struct UploadPage<'d> {
    base: PageBase<'d>,
}

impl UploadPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/upload/";

    /// `<input type="file">`
    #[must_use]
    pub fn file_input() -> Locator {
        Locator::id("uploadfile_0").described("file input")
    }

    /// Terms-of-service checkbox that must be ticked before submitting
    #[must_use]
    pub fn terms_checkbox() -> Locator {
        Locator::id("terms").described("accept terms")
    }

    /// Submit button
    #[must_use]
    pub fn submit_button() -> Locator {
        Locator::id("submitbutton").described("submit file")
    }

    /// Result banner
    #[must_use]
    pub fn result_banner() -> Locator {
        Locator::id("res").described("upload result")
    }

    /// Attach `path`, accept the terms and submit
    pub fn upload(&self, path: &Path) -> ProbeResult<()> {
        info!(path = %path.display(), "uploading file");
        let ui = self.base.ui();
        ui.upload_file(&Self::file_input(), path)?;
        ui.select_if_unselected(&Self::terms_checkbox())?;
        ui.click_robust(&Self::submit_button())?;
        Ok(())
    }

    /// Result banner text, waiting for it to render
    pub fn result_message(&self) -> ProbeResult<String> {
        self.base.ui().read_text(&Self::result_banner())
    }

    /// Whether the banner reports success
    pub fn is_upload_successful(&self) -> ProbeResult<bool> {
        Ok(self.result_message()?.contains(SUCCESS_MARKER))
    }
}

impl<'d> PageObject<'d> for UploadPage<'d> {
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
        "upload"
    }
}
