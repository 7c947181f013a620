//! Suite reports.
//!
//! A [`SuiteReport`] lists every case in run order with its terminal state
//! and, for failures and skips, an [`ErrorDescriptor`]. There is no partial
//! credit: each case is passed, failed or skipped.

use crate::orchestrator::CaseState;
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Why a case did not pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Error classification
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Upstream case, for dependency failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_dependency: Option<String>,
}

impl ErrorDescriptor {
    /// Create a descriptor
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            related_dependency: None,
        }
    }
}

impl From<&ProbeError> for ErrorDescriptor {
    fn from(err: &ProbeError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            related_dependency: err.related_dependency().map(str::to_string),
        }
    }
}

/// Outcome of one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case identifier
    pub id: String,
    /// Terminal state
    pub state: CaseState,
    /// Wall time spent on the case
    pub duration_ms: u64,
    /// Failure or skip reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

impl CaseReport {
    /// Whether the case failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.state == CaseState::Failed
    }
}

/// Outcome of a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite: String,
    /// Session backend the run used
    pub backend: String,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Total wall time
    pub duration_ms: u64,
    /// Cases in run order
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    fn count(&self, state: CaseState) -> usize {
        self.cases.iter().filter(|c| c.state == state).count()
    }

    /// Passed cases
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(CaseState::Passed)
    }

    /// Failed cases
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(CaseState::Failed)
    }

    /// Skipped cases
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(CaseState::Skipped)
    }

    /// True when no case failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Report for one case
    #[must_use]
    pub fn case(&self, id: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Failed cases
    #[must_use]
    pub fn failures(&self) -> Vec<&CaseReport> {
        self.cases.iter().filter(|c| c.is_failed()).collect()
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write JSON to `path`
    pub fn write_json(&self, path: &Path) -> ProbeResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Plain-text table, one line per case plus a summary
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Suite: {} ({})", self.suite, self.backend);
        let width = self.cases.iter().map(|c| c.id.len()).max().unwrap_or(0);
        for case in &self.cases {
            let _ = write!(
                out,
                "  {:<7} {:<width$} {:>6}ms",
                case.state.label(),
                case.id,
                case.duration_ms
            );
            if let Some(error) = &case.error {
                let _ = write!(out, "  [{}] {}", error.kind, error.message);
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "{} passed, {} failed, {} skipped in {}ms",
            self.passed(),
            self.failed(),
            self.skipped(),
            self.duration_ms
        );
        out
    }
}
