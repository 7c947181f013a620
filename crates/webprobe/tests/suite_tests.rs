//! End-to-end runs of the bundled suite against the in-memory demo site.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use webprobe::mock::{MockElement, MockPage};
use webprobe::page::{HistoryPage, HoverPage, RegistrationPage};
use webprobe::suite::{LOGOUT, REGISTRATION, VALID_LOGIN};
use webprobe::{
    demo_suite, CaseState, ErrorKind, Milestone, MockSessionFactory, MockSite, Orchestrator,
    SessionManager, SuiteConfig, SuiteReport, WaitOptions,
};

const BASE: &str = "https://demo.test";

fn config() -> SuiteConfig {
    SuiteConfig::default()
        .with_base_url(BASE)
        .with_account_email("u1@example.com")
        .with_wait(WaitOptions::new().with_timeout(400).with_poll_interval(5))
}

fn site() -> MockSite {
    MockSite::demo(BASE).expect("demo site")
}

fn orchestrator(site: &MockSite, config: SuiteConfig) -> Orchestrator {
    let sessions = SessionManager::new(MockSessionFactory::new(site.clone()));
    Orchestrator::new(demo_suite().expect("valid suite"), sessions, config)
}

fn state_of(report: &SuiteReport, id: &str) -> CaseState {
    report.case(id).expect("case in report").state
}

// ============================================================================
// Full runs
// ============================================================================

#[test]
fn test_full_suite_passes_on_demo_site() {
    let site = site();
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_suite();

    assert!(report.is_success(), "{}", report.render_text());
    assert_eq!(report.passed(), 14);
    assert_eq!(report.backend, "mock");
    assert_eq!(orchestrator.sessions().acquired(), 14);
    assert_eq!(orchestrator.sessions().open_sessions(), 0);
    assert_eq!(site.sessions_opened(), 14);
}

#[test]
fn test_account_chain_with_fixed_email() {
    let site = site();
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_suite();

    for id in [REGISTRATION, VALID_LOGIN, LOGOUT] {
        assert_eq!(state_of(&report, id), CaseState::Passed, "{id}");
    }
    assert!(site.has_account("u1@example.com"));
    let state = orchestrator.state();
    assert_eq!(state.registered_email(), Some("u1@example.com"));
    assert!(state.is_complete(Milestone::Registration));
    assert!(state.is_complete(Milestone::Login));
}

#[test]
fn test_report_serializes_every_case() {
    let mut orchestrator = orchestrator(&site(), config());
    let json = orchestrator.run_suite().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["suite"], "demo-site");
    assert_eq!(value["cases"].as_array().unwrap().len(), 14);
    assert!(!json.contains("Password123"));
}

// ============================================================================
// Dependency handling
// ============================================================================

#[test]
fn test_login_alone_fails_without_touching_the_driver() {
    let site = site();
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_filtered(VALID_LOGIN);

    let login = report.case(VALID_LOGIN).unwrap();
    assert_eq!(login.state, CaseState::Failed);
    let error = login.error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::DependencyUnmet);
    assert_eq!(error.related_dependency.as_deref(), Some(REGISTRATION));

    assert_eq!(state_of(&report, REGISTRATION), CaseState::Skipped);
    assert!(site.calls().is_empty());
    assert_eq!(orchestrator.sessions().acquired(), 0);
}

#[test]
fn test_broken_registration_fails_the_chain() {
    let site = site();
    site.make_unreachable(format!("{BASE}{}", RegistrationPage::PATH));
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_suite();

    assert_eq!(state_of(&report, REGISTRATION), CaseState::Failed);
    for id in [VALID_LOGIN, LOGOUT] {
        let case = report.case(id).unwrap();
        assert_eq!(case.state, CaseState::Failed);
        assert_eq!(case.error.as_ref().unwrap().kind, ErrorKind::DependencyUnmet);
    }
    assert_eq!(
        report.case(LOGOUT).unwrap().error.as_ref().unwrap().related_dependency.as_deref(),
        Some(REGISTRATION)
    );
    assert_eq!(state_of(&report, "m_textarea"), CaseState::Passed);
    // Dependency failures never acquire a session.
    assert_eq!(orchestrator.sessions().acquired(), 12);
}

#[test]
fn test_fail_fast_stops_after_first_failure() {
    let site = site();
    site.make_unreachable(format!("{BASE}{}", RegistrationPage::PATH));
    let mut orchestrator = orchestrator(&site, config().with_fail_fast(true));
    let report = orchestrator.run_suite();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 13);
    assert_eq!(orchestrator.sessions().acquired(), 1);
}

// ============================================================================
// Tolerated failures
// ============================================================================

#[test]
fn test_missing_tooltip_is_skipped() {
    let site = site();
    site.add_page(MockPage::new(format!("{BASE}{}", HoverPage::PATH), "Tooltip Demo"));
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_filtered("k_hover_tooltip");

    let hover = report.case("k_hover_tooltip").unwrap();
    assert_eq!(hover.state, CaseState::Skipped);
    let error = hover.error.as_ref().unwrap();
    assert_eq!(error.kind, ErrorKind::Skipped);
    assert!(error.message.contains("download button not present"), "{}", error.message);
    assert!(report.is_success());
}

#[test]
fn test_hidden_tooltip_is_skipped_after_hover() {
    let site = site();
    site.add_page(
        MockPage::new(format!("{BASE}{}", HoverPage::PATH), "Tooltip Demo").element(
            MockElement::new("download", "a")
                .matches(HoverPage::download_button())
                .text("Download now"),
        ),
    );
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_filtered("k_hover_tooltip");

    let hover = report.case("k_hover_tooltip").unwrap();
    assert_eq!(hover.state, CaseState::Skipped);
    assert!(hover.error.as_ref().unwrap().message.contains("tooltip"));
}

#[test]
fn test_static_pages_tolerate_partial_outage() {
    let site = site();
    site.make_unreachable(format!("{BASE}/test/"));
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_filtered("g_multiple_static_pages");
    assert_eq!(state_of(&report, "g_multiple_static_pages"), CaseState::Passed);
}

#[test]
fn test_static_pages_all_down_is_skipped() {
    let site = site();
    for path in ["/test/", "/test/drag_drop.html", HistoryPage::SECOND_PATH] {
        site.make_unreachable(format!("{BASE}{path}"));
    }
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_filtered("g_multiple_static_pages");
    assert_eq!(state_of(&report, "g_multiple_static_pages"), CaseState::Skipped);
}

#[test]
fn test_static_page_with_wrong_title_fails() {
    let site = site();
    site.add_page(MockPage::new(format!("{BASE}/test/drag_drop.html"), "Welcome"));
    let mut orchestrator = orchestrator(&site, config());
    let report = orchestrator.run_filtered("g_multiple_static_pages");
    let case = report.case("g_multiple_static_pages").unwrap();
    assert_eq!(case.state, CaseState::Failed);
    assert_eq!(case.error.as_ref().unwrap().kind, ErrorKind::AssertionFailed);
}
