//! Wait Mechanisms
//!
//! The wait engine bridges synchronous test code with an asynchronously
//! rendering page: a [`WaitCondition`] is evaluated against the live session
//! every poll interval until it is satisfied or the timeout elapses.
//!
//! - A satisfied evaluation returns immediately; there are no fixed sleeps.
//! - Errors raised while evaluating (element detached mid-read, page still
//!   navigating) mean "not yet" and polling continues.
//! - Usage errors and [`Poll::Failed`] abort the wait at once.

use crate::driver::{scripts, AutomationDriver, ElementHandle};
use crate::locator::Locator;
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::trace;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Lower bound on the polling interval so a zero setting cannot spin
const MIN_POLL_INTERVAL_MS: u64 = 1;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }
}

// =============================================================================
// WAIT CONDITION TRAIT
// =============================================================================

/// State of a condition at one evaluation
#[derive(Debug)]
pub enum Poll<T> {
    /// Condition holds; carries the produced value
    Ready(T),
    /// Not yet; keep polling
    Pending,
    /// Condition can never hold; stop polling
    Failed(ProbeError),
}

/// A predicate over the live session
pub trait WaitCondition {
    /// Value produced when the condition is satisfied
    type Output;

    /// Evaluate once against the current page state
    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<Self::Output>>;

    /// Description for error messages
    fn description(&self) -> String;
}

/// A closure-based wait condition
pub struct FnCondition<F>
where
    F: Fn(&dyn AutomationDriver) -> ProbeResult<bool>,
{
    func: F,
    description: String,
}

impl<F> std::fmt::Debug for FnCondition<F>
where
    F: Fn(&dyn AutomationDriver) -> ProbeResult<bool>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> FnCondition<F>
where
    F: Fn(&dyn AutomationDriver) -> ProbeResult<bool>,
{
    /// Create a new closure condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F> WaitCondition for FnCondition<F>
where
    F: Fn(&dyn AutomationDriver) -> ProbeResult<bool>,
{
    type Output = ();

    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<()>> {
        Ok(if (self.func)(driver)? {
            Poll::Ready(())
        } else {
            Poll::Pending
        })
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// BUILT-IN CONDITIONS
// =============================================================================

/// What an element must satisfy before it is handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRequirement {
    /// Attached to the DOM
    Present,
    /// Attached and rendered
    Visible,
    /// Rendered and enabled
    Clickable,
}

impl ElementRequirement {
    const fn label(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        }
    }
}

/// Resolve a locator to an element in a given state.
///
/// Remembers whether the locator ever matched so callers can tell
/// "never found" from "found but never ready".
#[derive(Debug)]
pub struct ElementState {
    locator: Locator,
    requirement: ElementRequirement,
    seen: Cell<bool>,
}

impl ElementState {
    /// Element attached to the DOM
    #[must_use]
    pub fn present(locator: &Locator) -> Self {
        Self::new(locator, ElementRequirement::Present)
    }

    /// Element rendered and visible
    #[must_use]
    pub fn visible(locator: &Locator) -> Self {
        Self::new(locator, ElementRequirement::Visible)
    }

    /// Element visible and enabled
    #[must_use]
    pub fn clickable(locator: &Locator) -> Self {
        Self::new(locator, ElementRequirement::Clickable)
    }

    fn new(locator: &Locator, requirement: ElementRequirement) -> Self {
        Self {
            locator: locator.clone(),
            requirement,
            seen: Cell::new(false),
        }
    }

    /// Whether any evaluation found a matching element
    #[must_use]
    pub fn was_found(&self) -> bool {
        self.seen.get()
    }

    /// The locator being resolved
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }
}

impl WaitCondition for ElementState {
    type Output = ElementHandle;

    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<ElementHandle>> {
        let Some(element) = driver.find_element(&self.locator)? else {
            return Ok(Poll::Pending);
        };
        self.seen.set(true);
        let ready = match self.requirement {
            ElementRequirement::Present => true,
            ElementRequirement::Visible => driver.is_displayed(&element)?,
            ElementRequirement::Clickable => {
                driver.is_displayed(&element)? && driver.is_enabled(&element)?
            }
        };
        Ok(if ready {
            Poll::Ready(element)
        } else {
            Poll::Pending
        })
    }

    fn description(&self) -> String {
        format!("element {}: {}", self.requirement.label(), self.locator)
    }
}

/// `document.readyState == "complete"`
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentReady;

impl WaitCondition for DocumentReady {
    type Output = ();

    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<()>> {
        let state = driver.execute_script(scripts::READY_STATE, &[])?;
        Ok(if state.as_str() == Some("complete") {
            Poll::Ready(())
        } else {
            Poll::Pending
        })
    }

    fn description(&self) -> String {
        "document ready state is complete".to_string()
    }
}

/// An element attribute contains a substring
#[derive(Debug, Clone)]
pub struct AttributeContains {
    locator: Locator,
    attribute: String,
    needle: String,
}

impl AttributeContains {
    /// Create the condition
    #[must_use]
    pub fn new(locator: &Locator, attribute: impl Into<String>, needle: impl Into<String>) -> Self {
        Self {
            locator: locator.clone(),
            attribute: attribute.into(),
            needle: needle.into(),
        }
    }
}

impl WaitCondition for AttributeContains {
    type Output = String;

    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<String>> {
        let Some(element) = driver.find_element(&self.locator)? else {
            return Ok(Poll::Pending);
        };
        match driver.attribute(&element, &self.attribute)? {
            Some(value) if value.contains(&self.needle) => Ok(Poll::Ready(value)),
            _ => Ok(Poll::Pending),
        }
    }

    fn description(&self) -> String {
        format!(
            "attribute '{}' of {} contains '{}'",
            self.attribute, self.locator, self.needle
        )
    }
}

/// The current URL contains a substring
#[derive(Debug, Clone)]
pub struct UrlContains(pub String);

impl WaitCondition for UrlContains {
    type Output = String;

    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<String>> {
        let url = driver.current_url()?;
        Ok(if url.contains(&self.0) {
            Poll::Ready(url)
        } else {
            Poll::Pending
        })
    }

    fn description(&self) -> String {
        format!("URL containing '{}'", self.0)
    }
}

/// The document title contains a substring
#[derive(Debug, Clone)]
pub struct TitleContains(pub String);

impl WaitCondition for TitleContains {
    type Output = String;

    fn evaluate(&self, driver: &dyn AutomationDriver) -> ProbeResult<Poll<String>> {
        let title = driver.title()?;
        Ok(if title.contains(&self.0) {
            Poll::Ready(title)
        } else {
            Poll::Pending
        })
    }

    fn description(&self) -> String {
        format!("title containing '{}'", self.0)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Successful wait
#[derive(Debug, Clone)]
pub struct WaitResult<T> {
    /// Value produced by the condition
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of evaluations
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Outcome of one poll loop
#[derive(Debug)]
pub enum WaitOutcome<T> {
    /// The condition held
    Satisfied(WaitResult<T>),
    /// The timeout elapsed first
    TimedOut {
        /// Time spent waiting
        elapsed: Duration,
        /// Condition description
        description: String,
        /// Last transient error seen while evaluating
        last_error: Option<String>,
    },
    /// The condition reported it can never hold
    Aborted(ProbeError),
}

impl<T> WaitOutcome<T> {
    /// Whether the condition was satisfied
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    /// Convert into a result, raising `Timeout` on timeout
    pub fn into_result(self, options: &WaitOptions) -> ProbeResult<WaitResult<T>> {
        match self {
            Self::Satisfied(result) => Ok(result),
            Self::TimedOut {
                description,
                last_error,
                ..
            } => Err(ProbeError::Timeout {
                condition: match last_error {
                    Some(err) => format!("{description} (last error: {err})"),
                    None => description,
                },
                ms: options.timeout_ms,
            }),
            Self::Aborted(err) => Err(err),
        }
    }
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Polls conditions against one driver session
#[derive(Debug, Clone, Copy)]
pub struct Waiter<'d> {
    driver: &'d dyn AutomationDriver,
    options: WaitOptions,
}

impl<'d> Waiter<'d> {
    /// Create a waiter with default options
    #[must_use]
    pub fn new(driver: &'d dyn AutomationDriver) -> Self {
        Self::with_options(driver, WaitOptions::default())
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(driver: &'d dyn AutomationDriver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Options used by the `*_until`/`await_*` helpers
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Poll with this waiter's options
    pub fn poll_until<C: WaitCondition>(&self, condition: &C) -> WaitOutcome<C::Output> {
        self.poll_until_with(condition, &self.options)
    }

    /// Poll `condition` until satisfied or `options.timeout_ms` elapses
    pub fn poll_until_with<C: WaitCondition>(
        &self,
        condition: &C,
        options: &WaitOptions,
    ) -> WaitOutcome<C::Output> {
        let start = Instant::now();
        let timeout = options.timeout();
        let poll_interval = options.poll_interval();
        let mut attempts = 0_u32;
        let mut last_error = None;

        loop {
            attempts += 1;
            match condition.evaluate(self.driver) {
                Ok(Poll::Ready(value)) => {
                    return WaitOutcome::Satisfied(WaitResult {
                        value,
                        elapsed: start.elapsed(),
                        attempts,
                        waited_for: condition.description(),
                    });
                }
                Ok(Poll::Pending) => {}
                Ok(Poll::Failed(err)) => return WaitOutcome::Aborted(err),
                Err(err) if err.kind() == ErrorKind::Usage => return WaitOutcome::Aborted(err),
                Err(err) => {
                    trace!(condition = %condition.description(), error = %err, "transient wait error");
                    last_error = Some(err.to_string());
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return WaitOutcome::TimedOut {
                    elapsed,
                    description: condition.description(),
                    last_error,
                };
            }
            std::thread::sleep(poll_interval.min(timeout - elapsed));
        }
    }

    /// Wait for a condition, raising `Timeout` if it never holds
    pub fn await_condition<C: WaitCondition>(
        &self,
        condition: &C,
    ) -> ProbeResult<WaitResult<C::Output>> {
        self.poll_until(condition).into_result(&self.options)
    }

    /// Wait for `document.readyState == "complete"`
    pub fn wait_for_document_ready(&self) -> ProbeResult<()> {
        self.await_condition(&DocumentReady).map(|_| ())
    }

    /// Wait until an attribute of the element contains `needle`
    pub fn wait_for_attribute_contains(
        &self,
        locator: &Locator,
        attribute: &str,
        needle: &str,
    ) -> ProbeResult<String> {
        self.await_condition(&AttributeContains::new(locator, attribute, needle))
            .map(|r| r.value)
    }

    /// Wait until the URL contains `fragment`
    pub fn wait_for_url_contains(&self, fragment: &str) -> ProbeResult<String> {
        self.await_condition(&UrlContains(fragment.to_string()))
            .map(|r| r.value)
    }

    /// Wait until the title contains `fragment`
    pub fn wait_for_title_contains(&self, fragment: &str) -> ProbeResult<String> {
        self.await_condition(&TitleContains(fragment.to_string()))
            .map(|r| r.value)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockElement, MockPage, MockSite};
    use std::cell::Cell;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(300).with_poll_interval(10)
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_wait_options_default() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_wait_options_builders() {
            let opts = WaitOptions::new().with_timeout(5000).with_poll_interval(25);
            assert_eq!(opts.timeout(), Duration::from_millis(5000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(25));
        }

        #[test]
        fn test_zero_poll_interval_is_clamped() {
            let opts = WaitOptions::new().with_poll_interval(0);
            assert_eq!(opts.poll_interval(), Duration::from_millis(1));
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let opts: WaitOptions = serde_yaml_ng::from_str("timeout_ms: 250").unwrap();
            assert_eq!(opts.timeout_ms, 250);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }
    }

    mod timing_tests {
        use super::*;

        #[test]
        fn test_returns_on_first_satisfied_evaluation() {
            let driver = MockSite::new().open_session();
            let waiter = Waiter::with_options(&driver, fast());
            let cond = FnCondition::new(|_| Ok(true), "always");
            let result = waiter.await_condition(&cond).unwrap();
            assert_eq!(result.attempts, 1);
            assert!(result.elapsed < Duration::from_millis(10));
        }

        #[test]
        fn test_satisfied_after_delay_returns_within_one_poll() {
            let driver = MockSite::new().open_session();
            let options = WaitOptions::new().with_timeout(1000).with_poll_interval(20);
            let waiter = Waiter::with_options(&driver, options);
            let start = Instant::now();
            let ready_at = Duration::from_millis(120);
            let cond = FnCondition::new(move |_| Ok(start.elapsed() >= ready_at), "delayed");

            let result = waiter.await_condition(&cond).unwrap();
            assert!(result.elapsed >= ready_at);
            assert!(
                result.elapsed < ready_at + Duration::from_millis(20) + Duration::from_millis(30),
                "elapsed {:?}",
                result.elapsed
            );
        }

        #[test]
        fn test_never_satisfied_times_out_near_deadline() {
            let driver = MockSite::new().open_session();
            let waiter = Waiter::with_options(&driver, fast());
            let cond = FnCondition::new(|_| Ok(false), "never");

            match waiter.poll_until(&cond) {
                WaitOutcome::TimedOut {
                    elapsed,
                    description,
                    last_error,
                } => {
                    assert!(elapsed >= Duration::from_millis(300));
                    assert!(elapsed < Duration::from_millis(300 + 60), "elapsed {elapsed:?}");
                    assert_eq!(description, "never");
                    assert!(last_error.is_none());
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_timeout_error_carries_description() {
            let driver = MockSite::new().open_session();
            let waiter = Waiter::with_options(&driver, fast());
            let err = waiter
                .await_condition(&FnCondition::new(|_| Ok(false), "spinner gone"))
                .unwrap_err();
            match err {
                ProbeError::Timeout { condition, ms } => {
                    assert!(condition.contains("spinner gone"));
                    assert_eq!(ms, 300);
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
        }
    }

    mod transient_error_tests {
        use super::*;

        #[test]
        fn test_transient_errors_keep_polling() {
            let driver = MockSite::new().open_session();
            let waiter = Waiter::with_options(&driver, fast());
            let calls = Cell::new(0);
            let cond = FnCondition::new(
                |_| {
                    calls.set(calls.get() + 1);
                    if calls.get() < 3 {
                        Err(ProbeError::driver("element detached"))
                    } else {
                        Ok(true)
                    }
                },
                "flaky",
            );
            let result = waiter.await_condition(&cond).unwrap();
            assert_eq!(result.attempts, 3);
        }

        #[test]
        fn test_last_transient_error_reported_on_timeout() {
            let driver = MockSite::new().open_session();
            let waiter = Waiter::with_options(&driver, fast());
            let cond = FnCondition::new(|_| Err(ProbeError::driver("detached")), "flaky");
            let err = waiter.await_condition(&cond).unwrap_err();
            assert!(err.to_string().contains("detached"));
            assert_eq!(err.kind(), ErrorKind::Timeout);
        }

        #[test]
        fn test_usage_error_aborts_immediately() {
            let driver = MockSite::new().open_session();
            let waiter = Waiter::with_options(&driver, fast());
            let calls = Cell::new(0);
            let cond = FnCondition::new(
                |_| {
                    calls.set(calls.get() + 1);
                    Err(ProbeError::invalid_argument("bad selector"))
                },
                "broken",
            );
            let err = waiter.await_condition(&cond).unwrap_err();
            assert_eq!(calls.get(), 1);
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
    }

    mod condition_tests {
        use super::*;

        fn site() -> MockSite {
            MockSite::new().page(
                MockPage::new("https://demo.test/menu", "Menu")
                    .ready_after(Duration::from_millis(60))
                    .element(
                        MockElement::new("menu-li", "li")
                            .matches(Locator::xpath("//li[@id='seo']"))
                            .attr("class", "dropdown open"),
                    )
                    .element(
                        MockElement::new("late", "div")
                            .matches(Locator::id("late"))
                            .appear_after(Duration::from_millis(50)),
                    ),
            )
        }

        #[test]
        fn test_document_ready_eventually_complete() {
            let driver = site().open_session();
            driver.navigate("https://demo.test/menu").unwrap();
            let waiter = Waiter::with_options(&driver, fast());
            let start = Instant::now();
            waiter.wait_for_document_ready().unwrap();
            assert!(start.elapsed() >= Duration::from_millis(50));
        }

        #[test]
        fn test_attribute_contains() {
            let driver = site().open_session();
            driver.navigate("https://demo.test/menu").unwrap();
            let waiter = Waiter::with_options(&driver, fast());
            let value = waiter
                .wait_for_attribute_contains(&Locator::xpath("//li[@id='seo']"), "class", "open")
                .unwrap();
            assert_eq!(value, "dropdown open");
        }

        #[test]
        fn test_element_state_tracks_whether_found() {
            let driver = site().open_session();
            driver.navigate("https://demo.test/menu").unwrap();
            let waiter = Waiter::with_options(&driver, fast());

            let missing = ElementState::present(&Locator::id("nope"));
            assert!(!waiter.poll_until(&missing).is_satisfied());
            assert!(!missing.was_found());

            let late = ElementState::visible(&Locator::id("late"));
            assert!(waiter.poll_until(&late).is_satisfied());
            assert!(late.was_found());
        }

        #[test]
        fn test_url_and_title_conditions() {
            let driver = site().open_session();
            driver.navigate("https://demo.test/menu").unwrap();
            let waiter = Waiter::with_options(&driver, fast());
            assert_eq!(
                waiter.wait_for_url_contains("/menu").unwrap(),
                "https://demo.test/menu"
            );
            assert_eq!(waiter.wait_for_title_contains("Men").unwrap(), "Menu");
        }
    }
}
