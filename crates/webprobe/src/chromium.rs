//! Chromium backend over CDP (feature `browser`).
//!
//! Each [`ChromiumDriver`] launches its own browser process, so every session
//! starts with a clean profile. The driver owns a current-thread tokio
//! runtime and blocks on every CDP call; the CDP event handler is spawned on
//! that runtime and makes progress whenever a call is in flight.
//!
//! Elements are located with the selector's JavaScript query and tagged with
//! a `data-webprobe-id` attribute. Handles re-select by that attribute, so a
//! handle from a previous document resolves to nothing and reports
//! `ElementNotFound`.
//!
//! Cookies go through the CDP cookie store rather than `document.cookie`, so
//! HttpOnly cookies and cookies scoped to other paths are visible too.

#![allow(clippy::cast_possible_truncation)]

use crate::driver::{AutomationDriver, Cookie, DriverConfig, ElementHandle};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionFactory;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType, InsertTextParams, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie as NetworkCookie, CookieParam, DeleteCookiesParams,
};
use chromiumoxide::cdp::browser_protocol::page::{
    GetNavigationHistoryParams, NavigateToHistoryEntryParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Attribute used to re-find located elements
const HANDLE_ATTR: &str = "data-webprobe-id";

/// Pointer steps used when dragging
const DRAG_STEPS: u32 = 10;

fn cdp_err(err: impl std::fmt::Display) -> ProbeError {
    ProbeError::driver(err.to_string())
}

fn stale(handle: &ElementHandle) -> ProbeError {
    ProbeError::ElementNotFound {
        locator: format!("stale element {}", handle.id),
        waited_ms: 0,
    }
}

#[derive(Debug, Deserialize)]
struct Located {
    id: String,
    tag: String,
}

#[derive(Debug, Deserialize)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct HitTest {
    center: Point,
    hit: bool,
    blocker: Option<String>,
}

/// One Chromium browser with a single page
pub struct ChromiumDriver {
    runtime: Runtime,
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: JoinHandle<()>,
    config: DriverConfig,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl std::fmt::Debug for ChromiumDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumDriver")
            .field("config", &self.config)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ChromiumDriver {
    /// Launch a browser and open a blank page
    ///
    /// # Errors
    ///
    /// `SessionUnavailable` if the browser cannot be started.
    pub fn launch(config: DriverConfig) -> ProbeResult<Self> {
        let unavailable = |err: &dyn std::fmt::Display| ProbeError::SessionUnavailable {
            message: err.to_string(),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut builder = BrowserConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout);
        if !config.headless {
            builder = builder.with_head();
        }
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(|e| unavailable(&e))?;

        let (browser, mut handler) = runtime
            .block_on(Browser::launch(cdp_config))
            .map_err(|e| unavailable(&e))?;

        let handler = runtime.spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = runtime
            .block_on(browser.new_page("about:blank"))
            .map_err(|e| unavailable(&e))?;
        debug!(headless = config.headless, "chromium session launched");

        Ok(Self {
            runtime,
            browser: Mutex::new(Some(browser)),
            page,
            handler,
            config,
            next_id: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        })
    }

    fn block_on<F: Future>(&self, future: F) -> ProbeResult<F::Output> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ProbeError::SessionUnavailable {
                message: "session already closed".to_string(),
            });
        }
        Ok(self.runtime.block_on(future))
    }

    /// Evaluate a function body and decode its JSON-serialized return value
    fn eval<T: DeserializeOwned>(&self, body: &str) -> ProbeResult<T> {
        let script = format!("JSON.stringify((function() {{ {body} }})() ?? null)");
        let raw: String = self
            .block_on(self.page.evaluate(script))?
            .map_err(cdp_err)?
            .into_value()
            .map_err(cdp_err)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn element_query(handle: &ElementHandle) -> String {
        format!("document.querySelector('[{HANDLE_ATTR}=\"{}\"]')", handle.id)
    }

    /// Run `body` with `el` bound to the handle's element
    fn on_element<T: DeserializeOwned>(&self, handle: &ElementHandle, body: &str) -> ProbeResult<T> {
        let wrapped = format!(
            "const el = {}; if (!el) return {{ stale: true }}; return {{ stale: false, value: (function(el) {{ {body} }})(el) ?? null }};",
            Self::element_query(handle)
        );
        let result: Value = self.eval(&wrapped)?;
        if result["stale"].as_bool().unwrap_or(true) {
            return Err(stale(handle));
        }
        Ok(serde_json::from_value(result["value"].clone())?)
    }

    fn mouse(&self, kind: DispatchMouseEventType, at: &Point, button: MouseButton) -> ProbeResult<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(at.x)
            .y(at.y)
            .button(button)
            .click_count(1)
            .build()
            .map_err(cdp_err)?;
        self.block_on(self.page.execute(params))?.map_err(cdp_err)?;
        Ok(())
    }

    fn center(&self, handle: &ElementHandle) -> ProbeResult<Point> {
        self.on_element(
            handle,
            "el.scrollIntoView({block: 'center', inline: 'center'}); \
             const r = el.getBoundingClientRect(); \
             return { x: r.left + r.width / 2, y: r.top + r.height / 2 };",
        )
    }

    fn with_browser<T>(&self, f: impl FnOnce(&Browser) -> ProbeResult<T>) -> ProbeResult<T> {
        let guard = self
            .browser
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let browser = guard.as_ref().ok_or_else(|| ProbeError::SessionUnavailable {
            message: "browser already closed".to_string(),
        })?;
        f(browser)
    }

    /// Every cookie in the session's store, HttpOnly and other paths included
    fn session_cookies(&self) -> ProbeResult<Vec<NetworkCookie>> {
        self.with_browser(|browser| self.block_on(browser.get_cookies()))?
            .map_err(cdp_err)
    }

    fn history_step(&self, delta: i64) -> ProbeResult<()> {
        let history = self
            .block_on(self.page.execute(GetNavigationHistoryParams::default()))?
            .map_err(cdp_err)?;
        let target = history.result.current_index + delta;
        let Some(entry) = usize::try_from(target)
            .ok()
            .and_then(|i| history.result.entries.get(i))
        else {
            debug!(delta, "no history entry, staying put");
            return Ok(());
        };
        self.block_on(self.page.execute(NavigateToHistoryEntryParams::new(entry.id)))?
            .map_err(cdp_err)?;
        self.block_on(self.page.wait_for_navigation())?
            .map_err(cdp_err)?;
        Ok(())
    }
}

impl AutomationDriver for ChromiumDriver {
    fn navigate(&self, url: &str) -> ProbeResult<()> {
        debug!(url, "navigate");
        let timeout = self.config.navigation_timeout;
        match self.block_on(tokio::time::timeout(timeout, self.page.goto(url)))? {
            Ok(result) => result.map(|_| ()).map_err(cdp_err),
            Err(_) => Err(ProbeError::Timeout {
                condition: format!("navigation to {url}"),
                ms: timeout.as_millis() as u64,
            }),
        }
    }

    fn current_url(&self) -> ProbeResult<String> {
        Ok(self
            .block_on(self.page.url())?
            .map_err(cdp_err)?
            .unwrap_or_default())
    }

    fn title(&self) -> ProbeResult<String> {
        Ok(self
            .block_on(self.page.get_title())?
            .map_err(cdp_err)?
            .unwrap_or_default())
    }

    fn find_element(&self, locator: &Locator) -> ProbeResult<Option<ElementHandle>> {
        let id = format!("wp-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let body = format!(
            "const el = {}; if (!el) return null; \
             if (!el.hasAttribute('{HANDLE_ATTR}')) el.setAttribute('{HANDLE_ATTR}', '{id}'); \
             return {{ id: el.getAttribute('{HANDLE_ATTR}'), tag: el.tagName.toLowerCase() }};",
            locator.selector().to_query()
        );
        let located: Option<Located> = self.eval(&body)?;
        Ok(located.map(|l| ElementHandle::new(l.id, l.tag)))
    }

    fn attribute(&self, element: &ElementHandle, name: &str) -> ProbeResult<Option<String>> {
        self.on_element(element, &format!("return el.getAttribute({name:?});"))
    }

    fn text(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.on_element(element, "return el.innerText ?? el.textContent ?? '';")
    }

    fn value(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.on_element(element, "return el.value ?? '';")
    }

    fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.on_element(element, "return !!(el.checked || el.selected);")
    }

    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.on_element(
            element,
            "const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';",
        )
    }

    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.on_element(element, "return !el.disabled;")
    }

    fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let probe: HitTest = self.on_element(
            element,
            "el.scrollIntoView({block: 'center', inline: 'center'}); \
             const r = el.getBoundingClientRect(); \
             const x = r.left + r.width / 2, y = r.top + r.height / 2; \
             const top = document.elementFromPoint(x, y); \
             const hit = !!top && (top === el || el.contains(top)); \
             return { center: { x, y }, hit, blocker: top && !hit ? top.outerHTML.slice(0, 80) : null };",
        )?;
        if !probe.hit {
            return Err(ProbeError::Interactable {
                locator: element.id.clone(),
                message: format!(
                    "click intercepted by {}",
                    probe.blocker.as_deref().unwrap_or("nothing at the element's center")
                ),
            });
        }
        self.mouse(DispatchMouseEventType::MousePressed, &probe.center, MouseButton::Left)?;
        self.mouse(DispatchMouseEventType::MouseReleased, &probe.center, MouseButton::Left)
    }

    fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.on_element::<Value>(
            element,
            "el.value = ''; el.dispatchEvent(new Event('input', {bubbles: true})); return true;",
        )
        .map(|_| ())
    }

    fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        self.on_element::<Value>(element, "el.focus(); return true;")?;
        self.block_on(self.page.execute(InsertTextParams::new(text)))?
            .map_err(cdp_err)?;
        self.on_element::<Value>(
            element,
            "el.dispatchEvent(new Event('change', {bubbles: true})); return true;",
        )
        .map(|_| ())
    }

    fn set_file(&self, element: &ElementHandle, path: &Path) -> ProbeResult<()> {
        if !path.is_file() {
            return Err(ProbeError::invalid_argument(format!(
                "upload source {} is not a file",
                path.display()
            )));
        }
        let node = self
            .block_on(self.page.find_element(format!("[{HANDLE_ATTR}=\"{}\"]", element.id)))?
            .map_err(|_| stale(element))?;
        let params = SetFileInputFilesParams::builder()
            .files(vec![path.display().to_string()])
            .backend_node_id(node.backend_node_id)
            .build()
            .map_err(cdp_err)?;
        self.block_on(self.page.execute(params))?.map_err(cdp_err)?;
        Ok(())
    }

    fn hover(&self, element: &ElementHandle) -> ProbeResult<()> {
        let center = self.center(element)?;
        self.mouse(DispatchMouseEventType::MouseMoved, &center, MouseButton::None)
    }

    fn drag_and_drop(&self, source: &ElementHandle, target: &ElementHandle) -> ProbeResult<()> {
        let from = self.center(source)?;
        self.mouse(DispatchMouseEventType::MouseMoved, &from, MouseButton::None)?;
        self.mouse(DispatchMouseEventType::MousePressed, &from, MouseButton::Left)?;
        let to = self.center(target)?;
        for step in 1..=DRAG_STEPS {
            let t = f64::from(step) / f64::from(DRAG_STEPS);
            let at = Point {
                x: from.x + (to.x - from.x) * t,
                y: from.y + (to.y - from.y) * t,
            };
            self.mouse(DispatchMouseEventType::MouseMoved, &at, MouseButton::Left)?;
        }
        self.mouse(DispatchMouseEventType::MouseReleased, &to, MouseButton::Left)
    }

    fn execute_script(&self, script: &str, args: &[ElementHandle]) -> ProbeResult<Value> {
        let elements = args
            .iter()
            .map(Self::element_query)
            .collect::<Vec<_>>()
            .join(", ");
        let body = format!(
            "const args = [{elements}]; \
             if (args.some(a => !a)) return {{ stale: true }}; \
             return {{ stale: false, value: (function() {{ {script} }}).apply(null, args) ?? null }};"
        );
        let result: Value = self.eval(&body)?;
        if result["stale"].as_bool().unwrap_or(true) {
            let first = args.first().map_or_else(|| ElementHandle::new("<none>", ""), Clone::clone);
            return Err(stale(&first));
        }
        Ok(result["value"].clone())
    }

    fn cookies(&self) -> ProbeResult<Vec<Cookie>> {
        Ok(self
            .session_cookies()?
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                path: Some(c.path),
            })
            .collect())
    }

    fn add_cookie(&self, cookie: &Cookie) -> ProbeResult<()> {
        let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
        param.path = Some(cookie.path.clone().unwrap_or_else(|| "/".to_string()));
        self.block_on(self.page.set_cookie(param))?
            .map_err(cdp_err)?;
        Ok(())
    }

    fn delete_cookie(&self, name: &str) -> ProbeResult<()> {
        for cookie in self.session_cookies()?.into_iter().filter(|c| c.name == name) {
            let mut params = DeleteCookiesParams::new(cookie.name);
            params.domain = Some(cookie.domain);
            params.path = Some(cookie.path);
            self.block_on(self.page.execute(params))?
                .map_err(cdp_err)?;
        }
        Ok(())
    }

    fn delete_all_cookies(&self) -> ProbeResult<()> {
        self.with_browser(|browser| self.block_on(browser.clear_cookies()))?
            .map_err(cdp_err)
    }

    fn back(&self) -> ProbeResult<()> {
        self.history_step(-1)
    }

    fn forward(&self) -> ProbeResult<()> {
        self.history_step(1)
    }

    fn refresh(&self) -> ProbeResult<()> {
        self.block_on(self.page.reload())?.map_err(cdp_err)?;
        Ok(())
    }

    fn quit(&self) -> ProbeResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let browser = self
            .browser
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(mut browser) = browser {
            if let Err(err) = self.runtime.block_on(browser.close()) {
                warn!(error = %err, "browser close failed");
            }
            if let Err(err) = self.runtime.block_on(browser.wait()) {
                warn!(error = %err, "browser process did not exit cleanly");
            }
        }
        self.handler.abort();
        Ok(())
    }
}

/// Launches one Chromium browser per session
#[derive(Debug, Clone, Default)]
pub struct ChromiumSessionFactory {
    config: DriverConfig,
}

impl ChromiumSessionFactory {
    /// Factory using `config` for every launch
    #[must_use]
    pub const fn new(config: DriverConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for ChromiumSessionFactory {
    fn create(&self) -> ProbeResult<Box<dyn AutomationDriver>> {
        Ok(Box::new(ChromiumDriver::launch(self.config.clone())?))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}
