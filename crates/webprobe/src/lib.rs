//! Webprobe: page-object browser testing with synchronized waits
//!
//! Webprobe drives a browser through a small capability trait and layers
//! synchronization, interaction and page modelling on top of it, so test
//! bodies read as user journeys instead of DOM plumbing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    WEBPROBE Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │   │ Orchestrator │──►│ Page objects │──►│ Interactor   │        │
//! │   │ (cases, deps)│   │ (locators)   │   │ (waits)      │        │
//! │   └──────┬───────┘   └──────────────┘   └──────┬───────┘        │
//! │          │ one session per case                │                │
//! │   ┌──────▼───────┐                      ┌──────▼───────┐        │
//! │   │ Session      │─────────────────────►│ Automation   │        │
//! │   │ Manager      │                      │ Driver       │        │
//! │   └──────────────┘                      └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use webprobe::{
//!     demo_suite, MockSessionFactory, MockSite, Orchestrator, SessionManager, SuiteConfig,
//! };
//!
//! let config = SuiteConfig::default()
//!     .with_base_url("https://demo.test")
//!     .with_account_email("u1@example.com");
//! let site = MockSite::demo(&config.base_url)?;
//! let sessions = SessionManager::new(MockSessionFactory::new(site));
//! let mut orchestrator = Orchestrator::new(demo_suite()?, sessions, config);
//! let report = orchestrator.run_suite();
//! assert!(report.is_success());
//! # Ok::<(), webprobe::ProbeError>(())
//! ```

#![warn(missing_docs)]

mod assertion;
#[cfg(feature = "browser")]
mod chromium;
mod config;
mod driver;
mod interaction;
mod locator;
mod report;
mod result;
mod session;
mod state;

/// In-memory driver and demo site
pub mod mock;

/// Orchestration: cases, suites and the runner
pub mod orchestrator;

/// Page objects for the demo application
pub mod page;

/// The bundled demo-site suite
pub mod suite;

/// Wait engine
pub mod wait;

pub use assertion::{ensure, ensure_eq, Assertion, AssertionResult};
#[cfg(feature = "browser")]
pub use chromium::{ChromiumDriver, ChromiumSessionFactory};
pub use config::{SuiteConfig, DEFAULT_ACCOUNT_PASSWORD, DEFAULT_BASE_URL};
pub use driver::{scripts, AutomationDriver, Cookie, DriverConfig, ElementHandle};
pub use interaction::{ClickAttempt, ClickStrategy, Interactor};
pub use locator::{Locator, Selector};
pub use mock::{MockDriver, MockSessionFactory, MockSite};
pub use orchestrator::{CaseContext, CaseState, Orchestrator, Suite, SuiteBuilder, TestCase};
pub use page::{PageBase, PageObject};
pub use report::{CaseReport, ErrorDescriptor, SuiteReport};
pub use result::{ErrorKind, ProbeError, ProbeResult};
pub use session::{Session, SessionFactory, SessionManager};
pub use state::{Milestone, SharedTestState};
pub use suite::demo_suite;
pub use wait::{WaitOptions, Waiter};
