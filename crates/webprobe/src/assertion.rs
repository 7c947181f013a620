//! Assertions for case bodies.
//!
//! Failures become [`ProbeError::AssertionFailed`] so a body can `?` them.

use crate::result::{ProbeError, ProbeResult};
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a result
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug>(what: &str, expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("{what}: expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a string contains at least one of `needles`
    #[must_use]
    pub fn contains_any(haystack: &str, needles: &[&str]) -> AssertionResult {
        if needles.iter().any(|n| haystack.contains(n)) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected '{haystack}' to contain one of {needles:?}"
            ))
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a condition is false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> AssertionResult {
        Self::is_true(!condition, message)
    }
}

/// Fail with `message` unless `condition` holds
pub fn ensure(condition: bool, message: &str) -> ProbeResult<()> {
    Assertion::is_true(condition, message).into_result()
}

/// Fail unless `actual == expected`
pub fn ensure_eq<T: PartialEq + Debug>(what: &str, expected: &T, actual: &T) -> ProbeResult<()> {
    Assertion::equals(what, expected, actual).into_result()
}
