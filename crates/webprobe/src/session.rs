//! Session Management
//!
//! One driver session per test case, created immediately before the case and
//! closed immediately after it on every exit path.
//!
//! - [`SessionFactory`] is the seam to a backend (mock or Chromium).
//! - [`Session`] closes its driver on drop, so early returns and panics still
//!   release it.
//! - Sessions are never pooled.

use crate::driver::AutomationDriver;
use crate::result::ProbeResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Creates fresh driver sessions
pub trait SessionFactory: std::fmt::Debug {
    /// Open a new session with clean navigation and cookie state.
    ///
    /// # Errors
    ///
    /// Returns an error if no browser session can be created.
    fn create(&self) -> ProbeResult<Box<dyn AutomationDriver>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// A driver session owned by one test case
pub struct Session {
    id: Uuid,
    driver: Box<dyn AutomationDriver>,
    closed: bool,
    counters: Arc<Counters>,
    opened_at: Instant,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Driver for this session
    #[must_use]
    pub fn driver(&self) -> &dyn AutomationDriver {
        self.driver.as_ref()
    }

    /// Quit the driver and report the result
    pub fn close(mut self) -> ProbeResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> ProbeResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let _ = self.counters.released.fetch_add(1, Ordering::SeqCst);
        debug!(session = %self.id, lifetime_ms = self.opened_at.elapsed().as_millis() as u64, "session released");
        self.driver.quit()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(session = %self.id, error = %err, "session quit failed");
        }
    }
}

/// Owns the session lifecycle for a suite run
#[derive(Debug)]
pub struct SessionManager {
    factory: Box<dyn SessionFactory>,
    counters: Arc<Counters>,
}

impl SessionManager {
    /// Create a manager over `factory`
    #[must_use]
    pub fn new(factory: impl SessionFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            counters: Arc::default(),
        }
    }

    /// Backend name
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.factory.name()
    }

    /// Open a fresh session.
    ///
    /// # Errors
    ///
    /// Propagates the factory's error, typically `SessionUnavailable`.
    pub fn acquire(&self) -> ProbeResult<Session> {
        let driver = self.factory.create()?;
        let _ = self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::new_v4();
        debug!(session = %id, backend = self.factory.name(), "session acquired");
        Ok(Session {
            id,
            driver,
            closed: false,
            counters: Arc::clone(&self.counters),
            opened_at: Instant::now(),
        })
    }

    /// Close a session explicitly
    pub fn release(&self, session: Session) -> ProbeResult<()> {
        session.close()
    }

    /// Run `body` with a fresh session, releasing it afterwards.
    ///
    /// The body's error takes precedence over a release error.
    pub fn with_session<T>(
        &self,
        body: impl FnOnce(&dyn AutomationDriver) -> ProbeResult<T>,
    ) -> ProbeResult<T> {
        let session = self.acquire()?;
        let result = body(session.driver());
        let released = self.release(session);
        let value = result?;
        released?;
        Ok(value)
    }

    /// Sessions opened so far
    #[must_use]
    pub fn acquired(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    #[must_use]
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Sessions currently open
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::{MockSessionFactory, MockSite};
    use crate::result::ProbeError;

    fn manager() -> (MockSite, SessionManager) {
        let site = MockSite::new();
        (site.clone(), SessionManager::new(MockSessionFactory::new(site)))
    }

    #[derive(Debug)]
    struct Unavailable;

    impl SessionFactory for Unavailable {
        fn create(&self) -> ProbeResult<Box<dyn AutomationDriver>> {
            Err(ProbeError::SessionUnavailable {
                message: "no browser".into(),
            })
        }

        fn name(&self) -> &'static str {
            "unavailable"
        }
    }

    #[test]
    fn test_acquire_release_counts() {
        let (site, sessions) = manager();
        let session = sessions.acquire().unwrap();
        assert_eq!(sessions.open_sessions(), 1);
        sessions.release(session).unwrap();
        assert_eq!(sessions.acquired(), 1);
        assert_eq!(sessions.released(), 1);
        assert!(site.calls().iter().any(|c| c.ends_with("quit")));
    }

    #[test]
    fn test_drop_releases() {
        let (_, sessions) = manager();
        {
            let _session = sessions.acquire().unwrap();
        }
        assert_eq!(sessions.released(), 1);
    }

    #[test]
    fn test_with_session_releases_on_error() {
        let (_, sessions) = manager();
        let result: ProbeResult<()> =
            sessions.with_session(|_| Err(ProbeError::assertion("boom")));
        assert!(matches!(result, Err(ProbeError::AssertionFailed { .. })));
        assert_eq!(sessions.open_sessions(), 0);
    }

    #[test]
    fn test_with_session_releases_on_panic() {
        let (_, sessions) = manager();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sessions.with_session(|_| -> ProbeResult<()> { panic!("body panicked") })
        }));
        assert!(outcome.is_err());
        assert_eq!(sessions.acquired(), 1);
        assert_eq!(sessions.released(), 1);
    }

    #[test]
    fn test_sessions_are_never_reused() {
        let (site, sessions) = manager();
        sessions.with_session(|_| Ok(())).unwrap();
        sessions.with_session(|_| Ok(())).unwrap();
        assert_eq!(site.sessions_opened(), 2);
    }

    #[test]
    fn test_factory_failure_acquires_nothing() {
        let sessions = SessionManager::new(Unavailable);
        assert!(sessions.acquire().is_err());
        assert_eq!(sessions.acquired(), 0);
        assert_eq!(sessions.backend(), "unavailable");
    }
}
