//! In-memory web application for deterministic tests.
//!
//! A [`MockSite`] holds server-side state (page templates, registered
//! accounts) shared by every session. Each [`MockDriver`] is one browser
//! session on that site with its own navigation stack, cookies and login
//! identity, so "one session per case" behaves like it does with a real
//! browser.
//!
//! Elements react to clicks, hovers and drops through [`MockAction`]
//! closures that mutate the page through a [`MockScope`].

mod site;

use crate::driver::{scripts, AutomationDriver, Cookie, ElementHandle};
use crate::locator::{Locator, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionFactory;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Callback run when a user interacts with a mock element
pub type MockAction = Arc<dyn Fn(&mut MockScope<'_>) + Send + Sync>;

/// Title served for URLs the site does not know
pub const NOT_FOUND_TITLE: &str = "404 Not Found";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// ELEMENTS AND PAGES
// =============================================================================

/// Behavior class of a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain element
    Generic,
    /// Checkbox; a click toggles it
    Checkbox,
    /// Radio button; a click selects it and clears its group
    Radio {
        /// Group name
        group: String,
    },
    /// Text input or textarea
    TextInput,
    /// `<input type="file">`
    FileInput,
}

/// One element on a mock page
#[derive(Clone)]
pub struct MockElement {
    key: String,
    tag: String,
    selectors: Vec<Selector>,
    kind: ElementKind,
    text: String,
    value: String,
    attributes: BTreeMap<String, String>,
    selected: bool,
    displayed: bool,
    enabled: bool,
    obscured: bool,
    appear_after: Duration,
    on_click: Option<MockAction>,
    on_hover: Option<MockAction>,
    on_drop: Option<MockAction>,
}

impl std::fmt::Debug for MockElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockElement")
            .field("key", &self.key)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .field("selected", &self.selected)
            .field("displayed", &self.displayed)
            .finish_non_exhaustive()
    }
}

impl MockElement {
    /// Create a visible, enabled element; `key` must be unique on its page
    #[must_use]
    pub fn new(key: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tag: tag.into(),
            selectors: Vec::new(),
            kind: ElementKind::Generic,
            text: String::new(),
            value: String::new(),
            attributes: BTreeMap::new(),
            selected: false,
            displayed: true,
            enabled: true,
            obscured: false,
            appear_after: Duration::ZERO,
            on_click: None,
            on_hover: None,
            on_drop: None,
        }
    }

    /// Text input element
    #[must_use]
    pub fn input(key: impl Into<String>) -> Self {
        Self::new(key, "input").kind(ElementKind::TextInput)
    }

    /// Checkbox element
    #[must_use]
    pub fn checkbox(key: impl Into<String>) -> Self {
        Self::new(key, "input").kind(ElementKind::Checkbox)
    }

    /// Radio element in `group`
    #[must_use]
    pub fn radio(key: impl Into<String>, group: impl Into<String>) -> Self {
        Self::new(key, "input").kind(ElementKind::Radio {
            group: group.into(),
        })
    }

    /// Respond to `locator`; an element may answer several locators
    #[must_use]
    pub fn matches(mut self, locator: Locator) -> Self {
        self.selectors.push(locator.selector().clone());
        self
    }

    /// Set the element kind
    #[must_use]
    pub fn kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set rendered text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Native clicks are intercepted by an overlay
    #[must_use]
    pub const fn obscured(mut self) -> Self {
        self.obscured = true;
        self
    }

    /// Attach to the DOM only after the page has been loaded this long
    #[must_use]
    pub const fn appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = delay;
        self
    }

    /// Run `action` after a click
    #[must_use]
    pub fn on_click(mut self, action: impl Fn(&mut MockScope<'_>) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Arc::new(action));
        self
    }

    /// Run `action` when hovered
    #[must_use]
    pub fn on_hover(mut self, action: impl Fn(&mut MockScope<'_>) + Send + Sync + 'static) -> Self {
        self.on_hover = Some(Arc::new(action));
        self
    }

    /// Run `action` when another element is dropped onto this one
    #[must_use]
    pub fn on_drop(mut self, action: impl Fn(&mut MockScope<'_>) + Send + Sync + 'static) -> Self {
        self.on_drop = Some(Arc::new(action));
        self
    }

    /// Unique key on its page
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current text
    #[must_use]
    pub fn current_text(&self) -> &str {
        &self.text
    }

    /// Current form value
    #[must_use]
    pub fn current_value(&self) -> &str {
        &self.value
    }

    /// Whether selected
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Whether displayed
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.displayed
    }

    /// Make visible or hidden
    pub fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    /// Replace the rendered text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let _ = self.attributes.insert(name.into(), value.into());
    }
}

/// A page template; every navigation loads a fresh copy
#[derive(Clone)]
pub struct MockPage {
    url: String,
    title: String,
    ready_after: Duration,
    elements: Vec<MockElement>,
    on_load: Option<MockAction>,
}

impl std::fmt::Debug for MockPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPage")
            .field("url", &self.url)
            .field("title", &self.title)
            .field("elements", &self.elements.len())
            .finish_non_exhaustive()
    }
}

impl MockPage {
    /// Create a page served at `url`
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ready_after: Duration::ZERO,
            elements: Vec::new(),
            on_load: None,
        }
    }

    /// Report `document.readyState == "loading"` for this long after load
    #[must_use]
    pub const fn ready_after(mut self, delay: Duration) -> Self {
        self.ready_after = delay;
        self
    }

    /// Add an element
    #[must_use]
    pub fn element(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Run `action` on every load, including reloads
    #[must_use]
    pub fn on_load(mut self, action: impl Fn(&mut MockScope<'_>) + Send + Sync + 'static) -> Self {
        self.on_load = Some(Arc::new(action));
        self
    }

    fn not_found(url: &str) -> Self {
        Self::new(url, NOT_FOUND_TITLE)
    }
}

// =============================================================================
// SCOPE
// =============================================================================

/// Mutable view of the loaded page handed to [`MockAction`]s
pub struct MockScope<'a> {
    elements: &'a mut Vec<MockElement>,
    accounts: &'a mut BTreeMap<String, String>,
    identity: &'a mut Option<String>,
    dragged: Option<String>,
    navigate_to: Option<String>,
}

impl std::fmt::Debug for MockScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockScope")
            .field("identity", &self.identity)
            .field("dragged", &self.dragged)
            .field("navigate_to", &self.navigate_to)
            .finish_non_exhaustive()
    }
}

impl MockScope<'_> {
    /// Element by key
    #[must_use]
    pub fn element(&self, key: &str) -> Option<&MockElement> {
        self.elements.iter().find(|e| e.key == key)
    }

    /// Mutable element by key
    pub fn element_mut(&mut self, key: &str) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.key == key)
    }

    /// Form value of an element, empty when absent
    #[must_use]
    pub fn value_of(&self, key: &str) -> String {
        self.element(key)
            .map(|e| e.value.clone())
            .unwrap_or_default()
    }

    /// Whether an element is selected
    #[must_use]
    pub fn is_selected(&self, key: &str) -> bool {
        self.element(key).is_some_and(|e| e.selected)
    }

    /// Attribute of an element
    #[must_use]
    pub fn attribute(&self, key: &str, name: &str) -> Option<String> {
        self.element(key)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    /// Set an attribute of an element
    pub fn set_attribute(&mut self, key: &str, name: &str, value: impl Into<String>) {
        if let Some(element) = self.element_mut(key) {
            element.set_attr(name, value);
        }
    }

    /// Show an element and set its text
    pub fn reveal(&mut self, key: &str, text: impl Into<String>) {
        if let Some(element) = self.element_mut(key) {
            element.text = text.into();
            element.displayed = true;
        }
    }

    /// Detach an element from the DOM
    pub fn remove(&mut self, key: &str) {
        self.elements.retain(|e| e.key != key);
    }

    /// Navigate once the current action returns
    pub fn navigate(&mut self, url: impl Into<String>) {
        self.navigate_to = Some(url.into());
    }

    /// Create an account; returns false if the email is taken
    pub fn register_account(&mut self, email: &str, password: &str) -> bool {
        if email.is_empty() || self.accounts.contains_key(email) {
            return false;
        }
        let _ = self
            .accounts
            .insert(email.to_string(), password.to_string());
        true
    }

    /// Check credentials against registered accounts
    #[must_use]
    pub fn authenticate(&self, email: &str, password: &str) -> bool {
        self.accounts.get(email).is_some_and(|p| p == password)
    }

    /// Logged-in identity of this session
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Log this session in or out
    pub fn set_identity(&mut self, identity: Option<String>) {
        *self.identity = identity;
    }

    /// Key of the element being dropped, inside `on_drop`
    #[must_use]
    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }
}

// =============================================================================
// SITE
// =============================================================================

#[derive(Debug, Default)]
struct SiteState {
    pages: BTreeMap<String, MockPage>,
    accounts: BTreeMap<String, String>,
    unreachable: BTreeSet<String>,
    calls: Vec<String>,
}

/// Server-side state shared by every session
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    inner: Arc<Mutex<SiteState>>,
    sessions: Arc<AtomicUsize>,
}

impl MockSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a page at its URL
    #[must_use]
    pub fn page(self, page: MockPage) -> Self {
        self.add_page(page);
        self
    }

    /// Serve a page at its URL
    pub fn add_page(&self, page: MockPage) {
        let _ = lock(&self.inner).pages.insert(page.url.clone(), page);
    }

    /// Make navigation to `url` fail with a network error
    pub fn make_unreachable(&self, url: impl Into<String>) {
        let _ = lock(&self.inner).unreachable.insert(url.into());
    }

    /// Pre-register an account
    pub fn add_account(&self, email: impl Into<String>, password: impl Into<String>) {
        let _ = lock(&self.inner)
            .accounts
            .insert(email.into(), password.into());
    }

    /// Whether an account exists
    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        lock(&self.inner).accounts.contains_key(email)
    }

    /// Open a new browser session on this site
    #[must_use]
    pub fn open_session(&self) -> MockDriver {
        let id = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        MockDriver {
            id,
            site: self.clone(),
            browser: Mutex::new(BrowserState::default()),
        }
    }

    /// Number of sessions opened so far
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// Every driver call made by any session, as `session#method:detail`
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        lock(&self.inner).calls.clone()
    }
}

// =============================================================================
// DRIVER
// =============================================================================

#[derive(Debug)]
struct LoadedPage {
    url: String,
    title: String,
    loaded_at: Instant,
    ready_after: Duration,
    generation: u64,
    elements: Vec<MockElement>,
}

#[derive(Debug, Default)]
struct BrowserState {
    page: Option<LoadedPage>,
    history: Vec<String>,
    position: usize,
    generation: u64,
    cookies: Vec<Cookie>,
    identity: Option<String>,
    calls: Vec<String>,
    closed: bool,
}

enum Trigger {
    Click,
    Hover,
    Drop { source: String },
}

/// One browser session on a [`MockSite`]
#[derive(Debug)]
pub struct MockDriver {
    id: usize,
    site: MockSite,
    browser: Mutex<BrowserState>,
}

impl MockDriver {
    /// Create a session on an empty site
    #[must_use]
    pub fn new() -> Self {
        MockSite::new().open_session()
    }

    /// Session number on its site, starting at 1
    #[must_use]
    pub const fn session_id(&self) -> usize {
        self.id
    }

    /// Calls made through this session
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.browser).calls.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        lock(&self.browser).calls.iter().any(|c| c.starts_with(method))
    }

    /// Logged-in identity of this session
    #[must_use]
    pub fn identity(&self) -> Option<String> {
        lock(&self.browser).identity.clone()
    }

    fn record(&self, browser: &mut BrowserState, call: String) -> ProbeResult<()> {
        lock(&self.site.inner)
            .calls
            .push(format!("{}#{call}", self.id));
        browser.calls.push(call);
        if browser.closed {
            return Err(ProbeError::SessionUnavailable {
                message: format!("session {} has been closed", self.id),
            });
        }
        Ok(())
    }

    fn load(&self, browser: &mut BrowserState, url: &str) -> ProbeResult<()> {
        let mut site = lock(&self.site.inner);
        if site.unreachable.contains(url) {
            return Err(ProbeError::driver(format!(
                "net::ERR_NAME_NOT_RESOLVED at {url}"
            )));
        }
        let template = site
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| MockPage::not_found(url));
        browser.generation += 1;
        let mut page = LoadedPage {
            url: url.to_string(),
            title: template.title,
            loaded_at: Instant::now(),
            ready_after: template.ready_after,
            generation: browser.generation,
            elements: template.elements,
        };
        // Redirects requested from on_load are ignored; pages render, they do not navigate.
        if let Some(action) = template.on_load {
            action(&mut MockScope {
                elements: &mut page.elements,
                accounts: &mut site.accounts,
                identity: &mut browser.identity,
                dragged: None,
                navigate_to: None,
            });
        }
        browser.page = Some(page);
        Ok(())
    }

    fn push(&self, browser: &mut BrowserState, url: &str) -> ProbeResult<()> {
        self.load(browser, url)?;
        if !browser.history.is_empty() {
            browser.history.truncate(browser.position + 1);
        }
        browser.history.push(url.to_string());
        browser.position = browser.history.len() - 1;
        Ok(())
    }

    fn page(browser: &BrowserState) -> ProbeResult<&LoadedPage> {
        browser
            .page
            .as_ref()
            .ok_or_else(|| ProbeError::driver("no page loaded"))
    }

    fn index_of(browser: &BrowserState, handle: &ElementHandle) -> ProbeResult<usize> {
        let stale = || ProbeError::ElementNotFound {
            locator: format!("stale element {}", handle.id),
            waited_ms: 0,
        };
        let page = browser.page.as_ref().ok_or_else(stale)?;
        let (generation, key) = handle.id.split_once(':').ok_or_else(stale)?;
        if generation != page.generation.to_string() {
            return Err(stale());
        }
        page.elements
            .iter()
            .position(|e| e.key == key)
            .ok_or_else(stale)
    }

    fn with_element<T>(
        &self,
        call: &str,
        handle: &ElementHandle,
        read: impl FnOnce(&MockElement) -> T,
    ) -> ProbeResult<T> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("{call}:{}", handle.id))?;
        let index = Self::index_of(&browser, handle)?;
        let page = Self::page(&browser)?;
        Ok(read(&page.elements[index]))
    }

    fn with_element_mut<T>(
        &self,
        call: &str,
        handle: &ElementHandle,
        write: impl FnOnce(&mut MockElement) -> ProbeResult<T>,
    ) -> ProbeResult<T> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("{call}:{}", handle.id))?;
        let index = Self::index_of(&browser, handle)?;
        let page = browser
            .page
            .as_mut()
            .ok_or_else(|| ProbeError::driver("no page loaded"))?;
        write(&mut page.elements[index])
    }

    /// Apply the element's own click semantics, then fire its handlers
    fn activate(&self, browser: &mut BrowserState, index: usize, trigger: Trigger) -> ProbeResult<()> {
        let mut site = lock(&self.site.inner);
        let page = browser
            .page
            .as_mut()
            .ok_or_else(|| ProbeError::driver("no page loaded"))?;

        let (action, dragged) = match trigger {
            Trigger::Click => {
                match page.elements[index].kind.clone() {
                    ElementKind::Checkbox => {
                        let element = &mut page.elements[index];
                        element.selected = !element.selected;
                    }
                    ElementKind::Radio { group } => {
                        for element in &mut page.elements {
                            if matches!(&element.kind, ElementKind::Radio { group: g } if *g == group) {
                                element.selected = false;
                            }
                        }
                        page.elements[index].selected = true;
                    }
                    _ => {}
                }
                (page.elements[index].on_click.clone(), None)
            }
            Trigger::Hover => (page.elements[index].on_hover.clone(), None),
            Trigger::Drop { source } => (page.elements[index].on_drop.clone(), Some(source)),
        };

        let Some(action) = action else {
            return Ok(());
        };
        let mut scope = MockScope {
            elements: &mut page.elements,
            accounts: &mut site.accounts,
            identity: &mut browser.identity,
            dragged,
            navigate_to: None,
        };
        action(&mut scope);
        let pending = scope.navigate_to;
        drop(site);
        if let Some(url) = pending {
            self.push(browser, &url)?;
        }
        Ok(())
    }

    fn travel(&self, call: &str, step: isize) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, call.to_string())?;
        let Some(target) = browser.position.checked_add_signed(step) else {
            return Ok(());
        };
        let Some(url) = browser.history.get(target).cloned() else {
            return Ok(());
        };
        browser.position = target;
        self.load(&mut browser, &url)
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationDriver for MockDriver {
    fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("navigate:{url}"))?;
        self.push(&mut browser, url)
    }

    fn current_url(&self) -> ProbeResult<String> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, "current_url".to_string())?;
        Ok(browser
            .page
            .as_ref()
            .map_or_else(|| "about:blank".to_string(), |p| p.url.clone()))
    }

    fn title(&self) -> ProbeResult<String> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, "title".to_string())?;
        Ok(browser
            .page
            .as_ref()
            .map(|p| p.title.clone())
            .unwrap_or_default())
    }

    fn find_element(&self, locator: &Locator) -> ProbeResult<Option<ElementHandle>> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("find_element:{}", locator.selector()))?;
        let Some(page) = browser.page.as_ref() else {
            return Ok(None);
        };
        let age = page.loaded_at.elapsed();
        Ok(page
            .elements
            .iter()
            .find(|e| age >= e.appear_after && e.selectors.contains(locator.selector()))
            .map(|e| ElementHandle::new(format!("{}:{}", page.generation, e.key), e.tag.clone())))
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        self.with_element("attribute", element, |e| match name {
            "value" => Some(e.value.clone()),
            _ => e.attributes.get(name).cloned(),
        })
    }

    fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.with_element("text", element, |e| {
            if e.displayed {
                e.text.clone()
            } else {
                String::new()
            }
        })
    }

    fn value(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.with_element("value", element, |e| e.value.clone())
    }

    fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_element("is_selected", element, |e| e.selected)
    }

    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_element("is_displayed", element, |e| e.displayed)
    }

    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_element("is_enabled", element, |e| e.enabled)
    }

    fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("click:{}", element.id))?;
        let index = Self::index_of(&browser, element)?;
        let target = &Self::page(&browser)?.elements[index];
        let refusal = if !target.displayed {
            Some("element is not visible")
        } else if !target.enabled {
            Some("element is disabled")
        } else if target.obscured {
            Some("click intercepted by an overlapping element")
        } else {
            None
        };
        if let Some(message) = refusal {
            return Err(ProbeError::Interactable {
                locator: element.id.clone(),
                message: message.to_string(),
            });
        }
        self.activate(&mut browser, index, Trigger::Click)
    }

    fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.with_element_mut("clear", element, |e| {
            e.value.clear();
            Ok(())
        })
    }

    fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let id = element.id.clone();
        self.with_element_mut("type_text", element, |e| {
            if !e.enabled || e.kind != ElementKind::TextInput {
                return Err(ProbeError::Interactable {
                    locator: id,
                    message: "element does not accept text".to_string(),
                });
            }
            e.value.push_str(text);
            Ok(())
        })
    }

    fn set_file(&self, element: &ElementHandle, path: &Path) -> ProbeResult<()> {
        if !path.is_file() {
            return Err(ProbeError::invalid_argument(format!(
                "file not found: {}",
                path.display()
            )));
        }
        let id = element.id.clone();
        self.with_element_mut("set_file", element, |e| {
            if e.kind != ElementKind::FileInput {
                return Err(ProbeError::Interactable {
                    locator: id,
                    message: "element is not a file input".to_string(),
                });
            }
            e.value = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(())
        })
    }

    fn hover(&self, element: &ElementHandle) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("hover:{}", element.id))?;
        let index = Self::index_of(&browser, element)?;
        self.activate(&mut browser, index, Trigger::Hover)
    }

    fn drag_and_drop(&self, source: &ElementHandle, target: &ElementHandle) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("drag_and_drop:{}->{}", source.id, target.id))?;
        let from = Self::index_of(&browser, source)?;
        let to = Self::index_of(&browser, target)?;
        let source = Self::page(&browser)?.elements[from].key.clone();
        self.activate(&mut browser, to, Trigger::Drop { source })
    }

    fn execute_script(
        &self,
        script: &str,
        args: &[ElementHandle],
    ) -> ProbeResult<serde_json::Value> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("execute_script:{script}"))?;
        match script {
            scripts::READY_STATE => {
                let state = match browser.page.as_ref() {
                    Some(page) if page.loaded_at.elapsed() < page.ready_after => "loading",
                    _ => "complete",
                };
                Ok(serde_json::Value::from(state))
            }
            scripts::CLICK => {
                let element = args
                    .first()
                    .ok_or_else(|| ProbeError::invalid_argument("click script needs an element"))?;
                let index = Self::index_of(&browser, element)?;
                self.activate(&mut browser, index, Trigger::Click)?;
                Ok(serde_json::Value::Bool(true))
            }
            other => Err(ProbeError::driver(format!("unsupported script: {other}"))),
        }
    }

    fn cookies(&self) -> ProbeResult<Vec<Cookie>> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, "cookies".to_string())?;
        Ok(browser.cookies.clone())
    }

    fn add_cookie(&self, cookie: &Cookie) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("add_cookie:{}", cookie.name))?;
        browser.cookies.retain(|c| c.name != cookie.name);
        browser.cookies.push(cookie.clone());
        Ok(())
    }

    fn delete_cookie(&self, name: &str) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, format!("delete_cookie:{name}"))?;
        browser.cookies.retain(|c| c.name != name);
        Ok(())
    }

    fn delete_all_cookies(&self) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, "delete_all_cookies".to_string())?;
        browser.cookies.clear();
        Ok(())
    }

    fn back(&self) -> ProbeResult<()> {
        self.travel("back", -1)
    }

    fn forward(&self) -> ProbeResult<()> {
        self.travel("forward", 1)
    }

    fn refresh(&self) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, "refresh".to_string())?;
        let url = Self::page(&browser)?.url.clone();
        self.load(&mut browser, &url)
    }

    fn quit(&self) -> ProbeResult<()> {
        let mut browser = lock(&self.browser);
        self.record(&mut browser, "quit".to_string())?;
        browser.closed = true;
        browser.page = None;
        Ok(())
    }
}

// =============================================================================
// SESSION FACTORY
// =============================================================================

/// Opens [`MockDriver`] sessions on a shared [`MockSite`]
#[derive(Debug, Clone)]
pub struct MockSessionFactory {
    site: MockSite,
}

impl MockSessionFactory {
    /// Create a factory for `site`
    #[must_use]
    pub const fn new(site: MockSite) -> Self {
        Self { site }
    }

    /// The site sessions are opened on
    #[must_use]
    pub const fn site(&self) -> &MockSite {
        &self.site
    }
}

impl SessionFactory for MockSessionFactory {
    fn create(&self) -> ProbeResult<Box<dyn AutomationDriver>> {
        Ok(Box::new(self.site.open_session()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const HOME: &str = "https://site.test/home";
    const ABOUT: &str = "https://site.test/about";

    fn site() -> MockSite {
        MockSite::new()
            .page(
                MockPage::new(HOME, "Home")
                    .element(MockElement::radio("r1", "g").matches(Locator::id("r1")))
                    .element(MockElement::radio("r2", "g").matches(Locator::id("r2")))
                    .element(MockElement::checkbox("c1").matches(Locator::id("c1")))
                    .element(
                        MockElement::new("cover", "button")
                            .matches(Locator::id("covered"))
                            .obscured()
                            .on_click(|scope| scope.navigate(ABOUT)),
                    )
                    .element(MockElement::input("name").matches(Locator::name("name"))),
            )
            .page(MockPage::new(ABOUT, "About"))
    }

    fn find(driver: &MockDriver, locator: &Locator) -> ElementHandle {
        driver.find_element(locator).unwrap().expect("element")
    }

    mod element_tests {
        use super::*;

        #[test]
        fn test_radio_group_is_exclusive() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            driver.click(&find(&driver, &Locator::id("r1"))).unwrap();
            driver.click(&find(&driver, &Locator::id("r2"))).unwrap();
            assert!(!driver.is_selected(&find(&driver, &Locator::id("r1"))).unwrap());
            assert!(driver.is_selected(&find(&driver, &Locator::id("r2"))).unwrap());
        }

        #[test]
        fn test_checkbox_toggles() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            let checkbox = find(&driver, &Locator::id("c1"));
            driver.click(&checkbox).unwrap();
            assert!(driver.is_selected(&checkbox).unwrap());
            driver.click(&checkbox).unwrap();
            assert!(!driver.is_selected(&checkbox).unwrap());
        }

        #[test]
        fn test_obscured_native_click_is_refused_but_script_click_works() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            let button = find(&driver, &Locator::id("covered"));
            let err = driver.click(&button).unwrap_err();
            assert!(matches!(err, ProbeError::Interactable { .. }));

            driver.execute_script(scripts::CLICK, &[button]).unwrap();
            assert_eq!(driver.current_url().unwrap(), ABOUT);
        }

        #[test]
        fn test_handles_go_stale_after_navigation() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            let radio = find(&driver, &Locator::id("r1"));
            driver.refresh().unwrap();
            let err = driver.is_selected(&radio).unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { .. }));
        }

        #[test]
        fn test_typing_appends_and_clear_resets() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            let input = find(&driver, &Locator::name("name"));
            driver.type_text(&input, "ab").unwrap();
            driver.type_text(&input, "c").unwrap();
            assert_eq!(driver.value(&input).unwrap(), "abc");
            driver.clear(&input).unwrap();
            assert_eq!(driver.value(&input).unwrap(), "");
        }
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_back_forward_follow_the_stack() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            driver.navigate(ABOUT).unwrap();
            driver.back().unwrap();
            assert_eq!(driver.current_url().unwrap(), HOME);
            driver.forward().unwrap();
            assert_eq!(driver.current_url().unwrap(), ABOUT);
            driver.forward().unwrap();
            assert_eq!(driver.current_url().unwrap(), ABOUT);
        }

        #[test]
        fn test_navigate_after_back_drops_forward_entries() {
            let driver = site().open_session();
            driver.navigate(HOME).unwrap();
            driver.navigate(ABOUT).unwrap();
            driver.back().unwrap();
            driver.navigate("https://site.test/other").unwrap();
            driver.forward().unwrap();
            assert_eq!(driver.current_url().unwrap(), "https://site.test/other");
            assert_eq!(driver.title().unwrap(), NOT_FOUND_TITLE);
        }

        #[test]
        fn test_unreachable_url_fails() {
            let site = site();
            site.make_unreachable(ABOUT);
            let driver = site.open_session();
            assert!(driver.navigate(ABOUT).is_err());
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_sessions_do_not_share_cookies() {
            let site = site();
            let first = site.open_session();
            first.add_cookie(&Cookie::new("a", "1")).unwrap();
            let second = site.open_session();
            assert!(second.cookies().unwrap().is_empty());
            assert_eq!(site.sessions_opened(), 2);
        }

        #[test]
        fn test_quit_closes_session() {
            let driver = site().open_session();
            driver.quit().unwrap();
            let err = driver.navigate(HOME).unwrap_err();
            assert!(matches!(err, ProbeError::SessionUnavailable { .. }));
        }

        #[test]
        fn test_call_log() {
            let site = site();
            let driver = site.open_session();
            driver.navigate(HOME).unwrap();
            assert!(driver.was_called("navigate"));
            assert!(!driver.was_called("click"));
            assert_eq!(site.calls(), vec![format!("1#navigate:{HOME}")]);
        }
    }
}
