//! The bundled end-to-end suite for the demo application.
//!
//! Identifiers sort lexically into run order. Only the account cases form a
//! dependency chain: registration, then login, then logout.

use crate::assertion::{ensure, ensure_eq, Assertion};
use crate::orchestrator::{CaseContext, Suite, SuiteBuilder, TestCase};
use crate::page::{
    CookieJar, DragDropPage, FormPage, HistoryPage, HomePage, HoverPage, LoginPage, MenuPage,
    PageObject, RegistrationPage, TextareaPage, UploadPage, CHOICE_COUNT, CONSENT_COOKIE,
};
use crate::result::{ProbeError, ProbeResult};
use crate::state::Milestone;
use std::io::Write;
use tracing::{info, warn};

/// Suite name used in reports
pub const SUITE_NAME: &str = "demo-site";

/// Registers the account the chain uses
pub const REGISTRATION: &str = "a1_user_registration";
/// Logs in with the registered account
pub const VALID_LOGIN: &str = "c_valid_login";
/// Logs the registered account out
pub const LOGOUT: &str = "d_user_logout";

/// Menu and entry exercised by the navigation case
const MENU: &str = "Selenium";
const MENU_OPTION: &str = "Drag and Drop";

/// Static pages and the keywords their titles may contain
const STATIC_PAGES: [(&str, &[&str]); 3] = [
    ("/test/", &["DatePicker", "Demo", "Date"]),
    ("/test/drag_drop.html", &["Drag", "Drop"]),
    ("/test/newtours/register.php", &["Register", "Mercury", "Tours"]),
];

const TEXTAREA_SAMPLE: &str = "Webprobe was here.\nSecond line stays intact.";

/// Build the demo suite
pub fn demo_suite() -> ProbeResult<Suite> {
    SuiteBuilder::new(SUITE_NAME)
        .case(TestCase::new(REGISTRATION, user_registration))
        .case(TestCase::new("a2_invalid_login_attempt", invalid_login_attempt))
        .case(TestCase::new(VALID_LOGIN, valid_login).depends_on(REGISTRATION, Milestone::Registration))
        .case(
            TestCase::new(LOGOUT, user_logout)
                .depends_on(REGISTRATION, Milestone::Registration)
                .depends_on(VALID_LOGIN, Milestone::Login),
        )
        .case(TestCase::new("e_form_interactions", form_interactions))
        .case(TestCase::new("f_file_upload", file_upload))
        .case(TestCase::new("g_multiple_static_pages", multiple_static_pages))
        .case(TestCase::new("h_complex_xpath", complex_xpath))
        .case(TestCase::new("i_cookie_manipulation", cookie_manipulation))
        .case(TestCase::new("j_drag_and_drop", drag_and_drop))
        .case(TestCase::new("k_hover_tooltip", hover_tooltip).best_effort())
        .case(TestCase::new("l_browser_history", browser_history))
        .case(TestCase::new("m_textarea", textarea))
        .case(TestCase::new("n_navigation_menu", navigation_menu))
        .build()
}

// =============================================================================
// ACCOUNT CHAIN
// =============================================================================

fn user_registration(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let email = ctx.config().account_email();
    let password = ctx.config().account_password.clone();

    let registration = ctx.page::<RegistrationPage<'_>>();
    registration.open()?;
    registration.register(&email, &password)?;

    let login = ctx.page::<LoginPage<'_>>();
    ensure(login.is_on_login_page()?, "registration should land on the login page")?;

    ctx.state_mut().record_registration(email, password);
    Ok(())
}

fn invalid_login_attempt(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let config = ctx.config();
    let login = ctx.page::<LoginPage<'_>>();
    login.open()?;
    login.log_in(&config.invalid_email, &config.invalid_password)?;

    ensure(login.is_on_login_page()?, "invalid credentials should stay on the login page")?;
    let home = ctx.page::<HomePage<'_>>();
    ensure(!home.is_logged_in()?, "invalid credentials must not log in")?;
    if let Some(message) = login.error_message()? {
        info!(message = %message, "login rejected");
    }
    Ok(())
}

fn log_in_registered(ctx: &CaseContext<'_>) -> ProbeResult<String> {
    let (email, password) = ctx.state().credentials()?;
    let login = ctx.page::<LoginPage<'_>>();
    login.open()?;
    login.log_in(email, password)?;
    Ok(email.to_string())
}

fn valid_login(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let email = log_in_registered(ctx)?;
    let home = ctx.page::<HomePage<'_>>();
    ensure(home.is_logged_in()?, "registered account should be logged in")?;
    ensure_eq("logged-in identity", &email, &home.logged_in_identity()?)?;

    let id = ctx.id();
    ctx.state_mut().record_login(id)
}

fn user_logout(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    log_in_registered(ctx)?;
    let home = ctx.page::<HomePage<'_>>();
    ensure(home.is_logged_in()?, "re-login before logout failed")?;
    home.log_out()?;

    let login = ctx.page::<LoginPage<'_>>();
    ensure(login.is_on_login_page()?, "logout should land on the login page")?;
    ensure(!home.is_logged_in()?, "session still shows a logged-in identity")
}

// =============================================================================
// INDEPENDENT CASES
// =============================================================================

fn form_interactions(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let form = ctx.page::<FormPage<'_>>();
    form.open()?;

    for option in 1..=CHOICE_COUNT {
        form.select_single_choice(option)?;
        for other in 1..=CHOICE_COUNT {
            ensure_eq(
                &format!("radio {other} after selecting {option}"),
                &(other == option),
                &form.is_single_choice_selected(other)?,
            )?;
        }
    }

    form.set_multi_choice(1, true)?;
    form.set_multi_choice(1, true)?;
    ensure(form.is_multi_choice_selected(1)?, "checkbox 1 should stay checked")?;
    form.set_multi_choice(1, false)?;
    ensure(!form.is_multi_choice_selected(1)?, "checkbox 1 should be unchecked")?;

    form.set_multi_choice(2, true)?;
    form.set_multi_choice(3, true)?;
    ensure(
        form.is_multi_choice_selected(2)? && form.is_multi_choice_selected(3)?,
        "checkboxes are independent",
    )
}

fn file_upload(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let mut file = tempfile::Builder::new()
        .prefix("webprobe-upload")
        .suffix(".txt")
        .tempfile()?;
    writeln!(file, "webprobe upload fixture")?;

    let upload = ctx.page::<UploadPage<'_>>();
    upload.open()?;
    upload.upload(file.path())?;
    let message = upload.result_message()?;
    ensure(
        upload.is_upload_successful()?,
        &format!("upload was not accepted: '{message}'"),
    )
}

fn multiple_static_pages(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let ui = ctx.interactor();
    let base = ctx.config().base_url.trim_end_matches('/');
    let mut loaded = 0;

    for (path, keywords) in STATIC_PAGES {
        let url = format!("{base}{path}");
        if let Err(err) = ui.open_url(&url) {
            warn!(url = %url, error = %err, "static page did not load");
            continue;
        }
        let title = ui.title()?;
        Assertion::contains_any(&title, keywords).into_result()?;
        loaded += 1;
    }

    if loaded == 0 {
        return Err(ProbeError::skipped("no static page could be loaded"));
    }
    Ok(())
}

fn complex_xpath(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let login = ctx.page::<LoginPage<'_>>();
    login.open()?;
    ensure_eq("sign-in label", &"Sign in", &login.sign_in_button_label()?.as_str())
}

fn cookie_manipulation(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let jar = ctx.page::<CookieJar<'_>>();
    jar.open()?;

    jar.add("testCookie", "testValue")?;
    ensure_eq("testCookie", &Some("testValue".to_string()), &jar.value_of("testCookie")?)?;

    jar.add_consent_cookie()?;
    ctx.interactor().refresh()?;
    ensure(
        jar.value_of(CONSENT_COOKIE.0)?.is_some(),
        "consent cookie should survive a refresh",
    )?;

    jar.delete_all()?;
    let remaining = jar.all()?;
    ensure(remaining.is_empty(), &format!("cookies left after delete: {remaining:?}"))
}

fn drag_and_drop(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let page = ctx.page::<DragDropPage<'_>>();
    page.open()?;
    page.complete_all()?;
    ctx.interactor().wait_for_visible(&DragDropPage::perfect_button())?;
    ensure(page.is_perfect_displayed()?, "'Perfect!' should be shown after every drop")
}

fn hover_tooltip(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let page = ctx.page::<HoverPage<'_>>();
    page.open()?;
    if !page.has_download_button()? {
        warn!(case = ctx.id(), "download button not present, tooltip cannot be checked");
        return Err(ProbeError::skipped("download button not present"));
    }
    ctx.best_effort("hover", page.hover_download_button())?;
    ctx.best_effort(
        "tooltip",
        ctx.interactor().wait_for_visible(&HoverPage::tooltip()),
    )?;
    let text = page.tooltip_text()?;
    ensure(!text.trim().is_empty(), "tooltip text is empty")
}

fn browser_history(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let history = ctx.page::<HistoryPage<'_>>();
    history.visit_first()?;
    history.visit_second()?;
    ensure(history.is_on_second()?, "should be on the second page")?;

    history.go_back()?;
    ensure(history.is_on_first()?, "back should return to the first page")?;
    history.go_forward()?;
    ensure(history.is_on_second()?, "forward should return to the second page")?;
    history.refresh()?;
    ensure(history.is_on_second()?, "refresh should stay on the second page")
}

fn textarea(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let page = ctx.page::<TextareaPage<'_>>();
    page.open()?;
    page.enter_text(TEXTAREA_SAMPLE)?;
    ensure_eq("textarea content", &TEXTAREA_SAMPLE, &page.text_content()?.as_str())
}

fn navigation_menu(ctx: &mut CaseContext<'_>) -> ProbeResult<()> {
    let menu = ctx.page::<MenuPage<'_>>();
    menu.open()?;
    menu.expand(MENU)?;
    menu.wait_until_expanded(MENU)?;
    ensure(menu.is_expanded(MENU)?, "menu should carry the open marker")?;

    menu.choose(MENU, MENU_OPTION)?;
    let url = ctx.interactor().current_url()?;
    ensure(
        url.ends_with(DragDropPage::PATH),
        &format!("menu entry led to {url}"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_suite_order() {
        let suite = demo_suite().unwrap();
        let ids = suite.ids();
        assert_eq!(ids.len(), 14);
        assert_eq!(ids[0], REGISTRATION);
        assert_eq!(ids[2], VALID_LOGIN);
        assert_eq!(ids[3], LOGOUT);
        assert_eq!(ids[13], "n_navigation_menu");
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_only_hover_is_best_effort() {
        let suite = demo_suite().unwrap();
        let best_effort: Vec<_> = suite
            .cases()
            .iter()
            .filter(|c| c.is_best_effort())
            .map(|c| c.id())
            .collect();
        assert_eq!(best_effort, vec!["k_hover_tooltip"]);
    }

    #[test]
    fn test_logout_dependencies() {
        let suite = demo_suite().unwrap();
        let logout = suite.cases().iter().find(|c| c.id() == LOGOUT).unwrap();
        let upstream: Vec<_> = logout.dependencies().iter().map(|d| d.case.as_str()).collect();
        assert_eq!(upstream, vec![REGISTRATION, VALID_LOGIN]);
    }
}
