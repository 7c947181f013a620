use super::{PageBase, PageObject};
use crate::locator::Locator;
use crate::result::ProbeResult;
use tracing::debug;

/// Marker class on the menu's `li` while its dropdown is open
const OPEN_MARKER: &str = "open";

/// Top navigation bar with dropdown menus.
///
/// Expansion is read from the `open` class on the ancestor `li`, never from
/// rendering.
#[derive(Debug, Clone)]
pub struct MenuPage<'d> {
    base: PageBase<'d>,
}

impl MenuPage<'_> {
    /// Site path
    pub const PATH: &'static str = "/test/radio.html";

    /// The navigation bar
    #[must_use]
    pub fn navbar() -> Locator {
        Locator::css(".navbar-nav").described("navigation bar")
    }

    /// Dropdown toggle for `menu`
    #[must_use]
    pub fn menu_toggle(menu: &str) -> Locator {
        Locator::xpath(format!(
            "//a[contains(text(),'{menu}') and contains(@class,'dropdown-toggle')]"
        ))
        .described(format!("{menu} menu toggle"))
    }

    /// `li` carrying the expansion marker for `menu`
    #[must_use]
    pub fn menu_item(menu: &str) -> Locator {
        Locator::xpath(format!("//a[contains(text(),'{menu}')]/parent::li"))
            .described(format!("{menu} menu"))
    }

    /// Entry `option` inside an open dropdown
    #[must_use]
    pub fn menu_option(option: &str) -> Locator {
        Locator::xpath(format!(
            "//ul[contains(@class,'dropdown-menu')]//a[contains(text(),'{option}')]"
        ))
        .described(format!("menu entry {option}"))
    }

    /// Open the dropdown for `menu`.
    ///
    /// Overlays on this page routinely swallow native clicks, so the toggle
    /// goes through the robust click.
    pub fn expand(&self, menu: &str) -> ProbeResult<()> {
        let ui = self.base.ui();
        ui.wait_for_visible(&Self::navbar())?;
        let strategy = ui.click_robust(&Self::menu_toggle(menu))?;
        debug!(menu, ?strategy, "menu toggled");
        Ok(())
    }

    /// Structural check: the menu's `li` carries the open marker
    pub fn is_expanded(&self, menu: &str) -> ProbeResult<bool> {
        let ui = self.base.ui();
        let item = Self::menu_item(menu);
        if !ui.is_present(&item)? {
            return Ok(false);
        }
        Ok(ui
            .read_attribute(&item, "class")?
            .is_some_and(|class| class.split_whitespace().any(|c| c == OPEN_MARKER)))
    }

    /// Wait until the dropdown for `menu` reports open
    pub fn wait_until_expanded(&self, menu: &str) -> ProbeResult<()> {
        self.base
            .ui()
            .waiter()
            .wait_for_attribute_contains(&Self::menu_item(menu), "class", OPEN_MARKER)
            .map(|_| ())
    }

    /// Expand `menu` if needed and pick `option`
    pub fn choose(&self, menu: &str, option: &str) -> ProbeResult<()> {
        if !self.is_expanded(menu)? {
            self.expand(menu)?;
            self.wait_until_expanded(menu)?;
        }
        let ui = self.base.ui();
        ui.click_robust(&Self::menu_option(option))?;
        ui.waiter().wait_for_document_ready()
    }
}

impl<'d> PageObject<'d> for MenuPage<'d> {
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
        "menu"
    }
}
