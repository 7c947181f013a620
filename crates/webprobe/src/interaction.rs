//! Interaction facade: robust click/type/read on a locator.
//!
//! Every operation resolves its locator through the [`Waiter`] before acting,
//! so callers never sleep. Resolution failures are mapped as:
//!
//! | observed                                  | error            |
//! |-------------------------------------------|------------------|
//! | locator never matched within the timeout  | `ElementNotFound`|
//! | matched, wanted state never reached       | `Timeout`        |
//! | matched and ready, driver refused action  | `Interactable`   |

use crate::driver::{scripts, AutomationDriver, Cookie, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{ElementState, WaitOptions, WaitOutcome, Waiter};
use std::path::Path;
use tracing::{debug, warn};

/// How a click was finally delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickStrategy {
    /// Native input dispatch
    Native,
    /// `element.click()` through script injection
    Injected,
}

/// Result of the two-step click strategy
#[derive(Debug)]
pub enum ClickAttempt {
    /// A strategy delivered the click
    Succeeded(ClickStrategy),
    /// Every applicable strategy failed; carries the last error
    Failed(ProbeError),
}

impl ClickAttempt {
    /// Whether the click was delivered
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Convert into a result
    pub fn into_result(self) -> ProbeResult<ClickStrategy> {
        match self {
            Self::Succeeded(strategy) => Ok(strategy),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Locator-level operations on one driver session
#[derive(Debug, Clone, Copy)]
pub struct Interactor<'d> {
    driver: &'d dyn AutomationDriver,
    options: WaitOptions,
}

impl<'d> Interactor<'d> {
    /// Create with default wait options
    #[must_use]
    pub fn new(driver: &'d dyn AutomationDriver) -> Self {
        Self::with_options(driver, WaitOptions::default())
    }

    /// Create with custom wait options
    #[must_use]
    pub const fn with_options(driver: &'d dyn AutomationDriver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &'d dyn AutomationDriver {
        self.driver
    }

    /// Wait options applied to every resolution
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Waiter bound to the same driver and options
    #[must_use]
    pub const fn waiter(&self) -> Waiter<'d> {
        Waiter::with_options(self.driver, self.options)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn resolve(&self, condition: &ElementState) -> ProbeResult<ElementHandle> {
        match self.waiter().poll_until(condition) {
            WaitOutcome::Satisfied(result) => Ok(result.value),
            WaitOutcome::TimedOut { elapsed, description, .. } => {
                if condition.was_found() {
                    Err(ProbeError::Timeout {
                        condition: description,
                        ms: self.options.timeout_ms,
                    })
                } else {
                    Err(ProbeError::ElementNotFound {
                        locator: condition.locator().description(),
                        waited_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    })
                }
            }
            WaitOutcome::Aborted(err) => Err(err),
        }
    }

    /// Wait until the locator matches an attached element
    pub fn wait_for_element(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        self.resolve(&ElementState::present(locator))
    }

    /// Wait until the locator matches a visible element
    pub fn wait_for_visible(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        self.resolve(&ElementState::visible(locator))
    }

    /// Wait until the locator matches a visible, enabled element
    pub fn wait_for_clickable(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        self.resolve(&ElementState::clickable(locator))
    }

    // =========================================================================
    // Clicks
    // =========================================================================

    /// Resolve as clickable, then click natively
    pub fn click(&self, locator: &Locator) -> ProbeResult<()> {
        debug!(locator = %locator, "click");
        let element = self.wait_for_clickable(locator)?;
        self.driver
            .click(&element)
            .map_err(|err| relabel(err, locator))
    }

    /// Click through script injection, bypassing native input dispatch
    fn click_injected(&self, locator: &Locator) -> ProbeResult<()> {
        debug!(locator = %locator, "injected click");
        let element = self.wait_for_element(locator)?;
        self.driver
            .execute_script(scripts::CLICK, &[element])
            .map(|_| ())
            .map_err(|err| relabel(err, locator))
    }

    /// Native click, falling back to an injected click only when the native
    /// path failed with `Interactable` or `Timeout`
    pub fn try_click(&self, locator: &Locator) -> ClickAttempt {
        match self.click(locator) {
            Ok(()) => ClickAttempt::Succeeded(ClickStrategy::Native),
            Err(err @ (ProbeError::Interactable { .. } | ProbeError::Timeout { .. })) => {
                warn!(locator = %locator, error = %err, "native click failed, injecting click");
                match self.click_injected(locator) {
                    Ok(()) => ClickAttempt::Succeeded(ClickStrategy::Injected),
                    Err(last) => ClickAttempt::Failed(last),
                }
            }
            Err(err) => ClickAttempt::Failed(err),
        }
    }

    /// [`try_click`](Self::try_click) as a result
    pub fn click_robust(&self, locator: &Locator) -> ProbeResult<ClickStrategy> {
        self.try_click(locator).into_result()
    }

    /// Click only when the selected state differs from `desired`.
    ///
    /// Returns whether a click was issued.
    pub fn set_checked(&self, locator: &Locator, desired: bool) -> ProbeResult<bool> {
        let element = self.wait_for_element(locator)?;
        if self.driver.is_selected(&element)? == desired {
            debug!(locator = %locator, desired, "already in desired state");
            return Ok(false);
        }
        self.click(locator)?;
        Ok(true)
    }

    /// Select if not yet selected
    pub fn select_if_unselected(&self, locator: &Locator) -> ProbeResult<bool> {
        self.set_checked(locator, true)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Replace the element's value with `text`
    pub fn type_text(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        debug!(locator = %locator, chars = text.chars().count(), "type");
        let element = self.wait_for_visible(locator)?;
        self.driver
            .clear(&element)
            .and_then(|()| self.driver.type_text(&element, text))
            .map_err(|err| relabel(err, locator))
    }

    /// Move the pointer over the element
    pub fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        debug!(locator = %locator, "hover");
        let element = self.wait_for_visible(locator)?;
        self.driver
            .hover(&element)
            .map_err(|err| relabel(err, locator))
    }

    /// Drag `source` onto `target`
    pub fn drag_to(&self, source: &Locator, target: &Locator) -> ProbeResult<()> {
        debug!(source = %source, target = %target, "drag");
        let from = self.wait_for_visible(source)?;
        let to = self.wait_for_visible(target)?;
        self.driver
            .drag_and_drop(&from, &to)
            .map_err(|err| relabel(err, source))
    }

    /// Attach a local file to a file input
    pub fn upload_file(&self, locator: &Locator, path: &Path) -> ProbeResult<()> {
        debug!(locator = %locator, path = %path.display(), "upload");
        let element = self.wait_for_element(locator)?;
        self.driver
            .set_file(&element, path)
            .map_err(|err| relabel(err, locator))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Visible text, trimmed
    pub fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.wait_for_visible(locator)?;
        let text = self.driver.text(&element)?;
        debug!(locator = %locator, text = %text, "read text");
        Ok(text.trim().to_string())
    }

    /// Attribute value
    pub fn read_attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        let element = self.wait_for_element(locator)?;
        self.driver.attribute(&element, name)
    }

    /// Form value of an input or textarea
    pub fn read_value(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.wait_for_element(locator)?;
        self.driver.value(&element)
    }

    /// Checked/selected state
    pub fn is_selected(&self, locator: &Locator) -> ProbeResult<bool> {
        let element = self.wait_for_element(locator)?;
        self.driver.is_selected(&element)
    }

    /// Whether the locator matches right now; never waits
    pub fn is_present(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.driver.find_element(locator)?.is_some())
    }

    /// Whether the locator matches a visible element right now; never waits
    pub fn is_displayed(&self, locator: &Locator) -> ProbeResult<bool> {
        match self.driver.find_element(locator)? {
            Some(element) => self.driver.is_displayed(&element),
            None => Ok(false),
        }
    }

    // =========================================================================
    // Navigation and session state
    // =========================================================================

    /// Navigate and wait for the document to finish loading
    pub fn open_url(&self, url: &str) -> ProbeResult<()> {
        debug!(url, "navigate");
        self.driver.navigate(url)?;
        self.waiter().wait_for_document_ready()
    }

    /// Current URL
    pub fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url()
    }

    /// Current title
    pub fn title(&self) -> ProbeResult<String> {
        self.driver.title()
    }

    /// History back, then wait for load
    pub fn back(&self) -> ProbeResult<()> {
        debug!("history back");
        self.driver.back()?;
        self.waiter().wait_for_document_ready()
    }

    /// History forward, then wait for load
    pub fn forward(&self) -> ProbeResult<()> {
        debug!("history forward");
        self.driver.forward()?;
        self.waiter().wait_for_document_ready()
    }

    /// Reload, then wait for load
    pub fn refresh(&self) -> ProbeResult<()> {
        debug!("reload");
        self.driver.refresh()?;
        self.waiter().wait_for_document_ready()
    }

    /// Session cookies
    pub fn cookies(&self) -> ProbeResult<Vec<Cookie>> {
        self.driver.cookies()
    }

    /// Add a cookie
    pub fn add_cookie(&self, cookie: &Cookie) -> ProbeResult<()> {
        debug!(name = %cookie.name, "add cookie");
        self.driver.add_cookie(cookie)
    }

    /// Delete every cookie
    pub fn delete_all_cookies(&self) -> ProbeResult<()> {
        debug!("delete all cookies");
        self.driver.delete_all_cookies()
    }
}

/// Put the locator description on driver-level `Interactable` errors
fn relabel(err: ProbeError, locator: &Locator) -> ProbeError {
    match err {
        ProbeError::Interactable { message, .. } => ProbeError::Interactable {
            locator: locator.description(),
            message,
        },
        other => other,
    }
}
