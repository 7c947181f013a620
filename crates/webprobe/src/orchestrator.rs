//! Test orchestration: ordered execution with dependency checks.
//!
//! ```text
//!            ┌─────────┐  dependency unmet / filtered / fail-fast
//!            │ Pending │──────────────────────────────┐
//!            └────┬────┘                              │
//!                 │ session acquired                  ▼
//!            ┌────▼────┐                     ┌──────────────────┐
//!            │ Running │────────────────────►│ Passed / Failed  │
//!            └─────────┘  body returns       │ / Skipped        │
//!                                            └──────────────────┘
//! ```
//!
//! Cases run one at a time in a total order fixed when the suite is built.
//! A case whose dependency milestone is not recorded in [`SharedTestState`]
//! fails with `DependencyUnmet` without acquiring a session or running its
//! body.

use crate::config::SuiteConfig;
use crate::driver::AutomationDriver;
use crate::interaction::Interactor;
use crate::page::{PageBase, PageObject};
use crate::report::{CaseReport, ErrorDescriptor, SuiteReport};
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionManager;
use crate::state::{Milestone, SharedTestState};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, info, warn};

// =============================================================================
// CASE STATE
// =============================================================================

/// Lifecycle of one case in one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Not started
    Pending,
    /// Body executing
    Running,
    /// Body completed
    Passed,
    /// Body or dependency check failed
    Failed,
    /// Not applicable in this run
    Skipped,
}

impl CaseState {
    /// Whether no further transition is allowed
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped)
    }

    /// Upper-case label for text output
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }

    /// Move to `next` if the lifecycle allows it
    pub fn transition(self, next: Self) -> ProbeResult<Self> {
        let allowed = match self {
            Self::Pending => matches!(next, Self::Running | Self::Failed | Self::Skipped),
            Self::Running => next.is_terminal(),
            Self::Passed | Self::Failed | Self::Skipped => false,
        };
        if allowed {
            Ok(next)
        } else {
            Err(ProbeError::invalid_argument(format!(
                "illegal case transition {self:?} -> {next:?}"
            )))
        }
    }
}

impl std::fmt::Display for CaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// TEST CASES
// =============================================================================

/// A milestone an upstream case must have recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Upstream case identifier
    pub case: String,
    /// Milestone that case records on success
    pub milestone: Milestone,
}

/// Case body
pub type CaseBody = Box<dyn Fn(&mut CaseContext<'_>) -> ProbeResult<()>>;

/// One test case
pub struct TestCase {
    id: String,
    order_key: Option<String>,
    dependencies: Vec<Dependency>,
    best_effort: bool,
    body: CaseBody,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("order_key", &self.order_key)
            .field("dependencies", &self.dependencies)
            .field("best_effort", &self.best_effort)
            .finish_non_exhaustive()
    }
}

impl TestCase {
    /// Create a case
    pub fn new(
        id: impl Into<String>,
        body: impl Fn(&mut CaseContext<'_>) -> ProbeResult<()> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            order_key: None,
            dependencies: Vec::new(),
            best_effort: false,
            body: Box::new(body),
        }
    }

    /// Require `milestone` recorded by case `case`
    #[must_use]
    pub fn depends_on(mut self, case: impl Into<String>, milestone: Milestone) -> Self {
        self.dependencies.push(Dependency {
            case: case.into(),
            milestone,
        });
        self
    }

    /// Order by `key` instead of the identifier
    #[must_use]
    pub fn ordered_by(mut self, key: impl Into<String>) -> Self {
        self.order_key = Some(key.into());
        self
    }

    /// Allow [`CaseContext::best_effort`] to turn interaction failures into skips
    #[must_use]
    pub const fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordering key
    #[must_use]
    pub fn order_key(&self) -> &str {
        self.order_key.as_deref().unwrap_or(&self.id)
    }

    /// Declared dependencies
    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Whether declared best-effort
    #[must_use]
    pub const fn is_best_effort(&self) -> bool {
        self.best_effort
    }
}

// =============================================================================
// SUITE
// =============================================================================

/// Collects cases before validation
#[derive(Debug, Default)]
pub struct SuiteBuilder {
    name: String,
    cases: Vec<TestCase>,
}

impl SuiteBuilder {
    /// Start a suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Add a case
    #[must_use]
    pub fn case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// Fix the order and validate dependencies.
    ///
    /// # Errors
    ///
    /// `InvalidSuite` on duplicate identifiers, dependencies on unknown or
    /// later cases, or best-effort cases inside a dependency chain.
    pub fn build(mut self) -> ProbeResult<Suite> {
        self.cases
            .sort_by(|a, b| a.order_key().cmp(b.order_key()).then_with(|| a.id.cmp(&b.id)));

        let mut seen = BTreeSet::new();
        for case in &self.cases {
            if !seen.insert(case.id.as_str()) {
                return Err(ProbeError::invalid_suite(format!(
                    "duplicate case id '{}'",
                    case.id
                )));
            }
        }

        let upstream: BTreeSet<&str> = self
            .cases
            .iter()
            .flat_map(|c| c.dependencies.iter().map(|d| d.case.as_str()))
            .collect();

        for (position, case) in self.cases.iter().enumerate() {
            for dependency in &case.dependencies {
                match self.cases.iter().position(|c| c.id == dependency.case) {
                    None => {
                        return Err(ProbeError::invalid_suite(format!(
                            "'{}' depends on unknown case '{}'",
                            case.id, dependency.case
                        )))
                    }
                    Some(upstream_position) if upstream_position >= position => {
                        return Err(ProbeError::invalid_suite(format!(
                            "'{}' depends on '{}', which runs after it",
                            case.id, dependency.case
                        )))
                    }
                    Some(_) => {}
                }
            }
            if case.best_effort && (!case.dependencies.is_empty() || upstream.contains(case.id.as_str())) {
                return Err(ProbeError::invalid_suite(format!(
                    "'{}' is part of a dependency chain and cannot be best-effort",
                    case.id
                )));
            }
        }

        Ok(Suite {
            name: self.name,
            cases: self.cases,
        })
    }
}

/// Validated cases in run order
#[derive(Debug)]
pub struct Suite {
    name: String,
    cases: Vec<TestCase>,
}

impl Suite {
    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cases in run order
    #[must_use]
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Case identifiers in run order
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.cases.iter().map(TestCase::id).collect()
    }
}

// =============================================================================
// CASE CONTEXT
// =============================================================================

/// What a running case body can reach
pub struct CaseContext<'a> {
    case_id: &'a str,
    best_effort: bool,
    driver: &'a dyn AutomationDriver,
    state: &'a mut SharedTestState,
    config: &'a SuiteConfig,
}

impl std::fmt::Debug for CaseContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseContext")
            .field("case_id", &self.case_id)
            .field("best_effort", &self.best_effort)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> CaseContext<'a> {
    /// Create a context; the orchestrator does this for every run
    pub fn new(
        case_id: &'a str,
        driver: &'a dyn AutomationDriver,
        state: &'a mut SharedTestState,
        config: &'a SuiteConfig,
    ) -> Self {
        Self {
            case_id,
            best_effort: false,
            driver,
            state,
            config,
        }
    }

    /// Identifier of the running case
    #[must_use]
    pub const fn id(&self) -> &'a str {
        self.case_id
    }

    /// This case's session
    #[must_use]
    pub fn driver(&self) -> &'a dyn AutomationDriver {
        self.driver
    }

    /// Interaction facade using the configured waits
    #[must_use]
    pub fn interactor(&self) -> Interactor<'a> {
        Interactor::with_options(self.driver, self.config.wait)
    }

    /// Instantiate a page object on this session
    #[must_use]
    pub fn page<P: PageObject<'a>>(&self) -> P {
        P::new(PageBase::new(self.interactor(), &self.config.base_url))
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        self.config
    }

    /// Shared state
    #[must_use]
    pub fn state(&self) -> &SharedTestState {
        self.state
    }

    /// Shared state for recording milestones
    pub fn state_mut(&mut self) -> &mut SharedTestState {
        self.state
    }

    /// Convert an interaction failure into `Skipped` for best-effort cases.
    ///
    /// Other errors, and every error in a case not declared best-effort,
    /// pass through unchanged.
    pub fn best_effort<T>(&self, what: &str, result: ProbeResult<T>) -> ProbeResult<T> {
        match result {
            Err(err) if self.best_effort && err.is_interaction_failure() => {
                warn!(case = self.case_id, what, error = %err, "best-effort step unavailable");
                Err(ProbeError::skipped(format!("{what}: {err}")))
            }
            other => other,
        }
    }
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

/// Runs a [`Suite`] with one session per case
#[derive(Debug)]
pub struct Orchestrator {
    suite: Suite,
    sessions: SessionManager,
    config: SuiteConfig,
    state: SharedTestState,
}

impl Orchestrator {
    /// Create an orchestrator
    #[must_use]
    pub fn new(suite: Suite, sessions: SessionManager, config: SuiteConfig) -> Self {
        Self {
            suite,
            sessions,
            config,
            state: SharedTestState::new(),
        }
    }

    /// The suite
    #[must_use]
    pub const fn suite(&self) -> &Suite {
        &self.suite
    }

    /// Session manager, for lifecycle counters
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Shared state left by the latest run
    #[must_use]
    pub const fn state(&self) -> &SharedTestState {
        &self.state
    }

    /// Run every case
    pub fn run_suite(&mut self) -> SuiteReport {
        self.run(None)
    }

    /// Run cases whose id contains `pattern`; the rest are skipped
    pub fn run_filtered(&mut self, pattern: &str) -> SuiteReport {
        self.run(Some(pattern))
    }

    fn run(&mut self, filter: Option<&str>) -> SuiteReport {
        let Self {
            suite,
            sessions,
            config,
            state,
        } = self;
        *state = SharedTestState::new();

        let started_at = chrono::Utc::now();
        let start = Instant::now();
        let mut halted = false;
        let mut cases = Vec::with_capacity(suite.cases.len());

        info!(suite = %suite.name, cases = suite.cases.len(), backend = sessions.backend(), "suite started");
        for case in &suite.cases {
            let case_start = Instant::now();
            let mut current = CaseState::Pending;

            let (next, error) = if filter.is_some_and(|p| !case.id.contains(p)) {
                (CaseState::Skipped, Some(ProbeError::skipped("filtered out")))
            } else if halted {
                (CaseState::Skipped, Some(ProbeError::skipped("fail-fast")))
            } else if let Some(dependency) = unmet_dependency(case, state) {
                (
                    CaseState::Failed,
                    Some(ProbeError::DependencyUnmet {
                        dependency: dependency.case.clone(),
                    }),
                )
            } else {
                advance(&case.id, &mut current, CaseState::Running);
                info!(case = %case.id, "running");
                match execute(case, sessions, config, state) {
                    Ok(()) => (CaseState::Passed, None),
                    Err(err @ ProbeError::Skipped { .. }) => (CaseState::Skipped, Some(err)),
                    Err(err) => (CaseState::Failed, Some(err)),
                }
            };
            advance(&case.id, &mut current, next);

            match (&current, &error) {
                (CaseState::Failed, Some(err)) => error!(case = %case.id, error = %err, "case failed"),
                (CaseState::Skipped, Some(err)) => info!(case = %case.id, reason = %err, "case skipped"),
                _ => info!(case = %case.id, "case passed"),
            }
            if current == CaseState::Failed && config.fail_fast {
                halted = true;
            }

            cases.push(CaseReport {
                id: case.id.clone(),
                state: current,
                duration_ms: case_start.elapsed().as_millis() as u64,
                error: error.as_ref().map(ErrorDescriptor::from),
            });
        }

        let report = SuiteReport {
            suite: suite.name.clone(),
            backend: sessions.backend().to_string(),
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
            cases,
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "suite finished"
        );
        report
    }
}

fn advance(case: &str, current: &mut CaseState, next: CaseState) {
    match current.transition(next) {
        Ok(state) => *current = state,
        Err(err) => {
            error!(case, error = %err, "forcing case to failed");
            *current = CaseState::Failed;
        }
    }
}

fn unmet_dependency<'c>(case: &'c TestCase, state: &SharedTestState) -> Option<&'c Dependency> {
    case.dependencies
        .iter()
        .find(|d| !state.is_complete(d.milestone))
}

/// Run one body inside its own session; the session is released even if the
/// body panics.
///
/// Shared state written by the body is kept only when the body succeeds.
fn execute(
    case: &TestCase,
    sessions: &SessionManager,
    config: &SuiteConfig,
    state: &mut SharedTestState,
) -> ProbeResult<()> {
    let session = sessions.acquire()?;
    let snapshot = state.clone();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut ctx = CaseContext::new(&case.id, session.driver(), state, config);
        ctx.best_effort = case.best_effort;
        (case.body)(&mut ctx)
    }));
    if let Err(err) = sessions.release(session) {
        warn!(case = %case.id, error = %err, "session release failed");
    }
    let result = match outcome {
        Ok(result) => result,
        Err(payload) => Err(ProbeError::assertion(format!(
            "case panicked: {}",
            panic_message(payload.as_ref())
        ))),
    };
    if result.is_err() && *state != snapshot {
        debug!(case = %case.id, "discarding shared state written by unsuccessful case");
        *state = snapshot;
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
