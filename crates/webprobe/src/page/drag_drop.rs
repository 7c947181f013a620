use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;
use tracing::debug;

/// Banking drag-and-drop exercise: four blocks onto four slots
#[derive(Debug, Clone)]
pub struct DragDropPage<'d> {
    base: PageBase<'d>,
}

impl DragDropPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/drag_drop.html";

    /// `(source, target)` pairs in the order they are dragged
    #[must_use]
    pub fn moves() -> [(Locator, Locator); 4] {
        let block = |css: &str, label: &str| Locator::css(css).described(label);
        [
            (block("#credit2 a", "BANK block"), block("#bank li", "debit account slot")),
            (block("#fourth a", "5000 block"), block("#amt7 li", "debit amount slot")),
            (block("#credit1 a", "SALES block"), block("#loan li", "credit account slot")),
            (block("#fourth a", "5000 block"), block("#amt8 li", "credit amount slot")),
        ]
    }

    /// Button revealed once the ledger balances
    #[must_use]
    pub fn perfect_button() -> Locator {
        Locator::xpath("//a[contains(text(),'Perfect!')]").described("Perfect! button")
    }

    /// Perform every move in order
    pub fn complete_all(&self) -> ProbeResult<()> {
        let ui = self.base.ui();
        for (source, target) in Self::moves() {
            debug!(source = %source, target = %target, "drag move");
            ui.drag_to(&source, &target)?;
        }
        Ok(())
    }

    /// Structural check: the "Perfect!" button is visible
    pub fn is_perfect_displayed(&self) -> ProbeResult<bool> {
        self.base.ui().is_displayed(&Self::perfect_button())
    }
}

impl<'d> PageObject<'d> for DragDropPage<'d> {
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
        "drag-and-drop"
    }
}
