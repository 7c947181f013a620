//! Mock rendition of the demo application the bundled suite targets.

use super::{ElementKind, MockElement, MockPage, MockSite};
use crate::page::{
    CookieJar, DragDropPage, FormPage, HistoryPage, HomePage, HoverPage, LoginPage, MenuPage,
    RegistrationPage, TextareaPage, UploadPage, CHOICE_COUNT,
};
use crate::result::ProbeResult;
use std::time::Duration;

/// Menu served on the form page, with its entries and their targets
const MENU: &str = "Selenium";
const MENU_ENTRIES: [(&str, &str); 2] = [
    ("Drag and Drop", DragDropPage::PATH),
    ("Tooltip", HoverPage::PATH),
];

/// Delay before `document.readyState` reports complete on heavier pages
const LOAD_DELAY: Duration = Duration::from_millis(20);

impl MockSite {
    /// Mock of the demo application served under `base_url`.
    ///
    /// Locators come from the page objects, so the pages and the suite always
    /// agree on the DOM.
    pub fn demo(base_url: &str) -> ProbeResult<Self> {
        let base = base_url.trim_end_matches('/').to_string();
        let url = |path: &str| format!("{base}{path}");
        let site = Self::new();

        site.add_page(registration(&url(RegistrationPage::PATH), url(LoginPage::PATH)));
        site.add_page(login(&url(LoginPage::PATH), url(HomePage::PATH)));
        site.add_page(home(&url(HomePage::PATH), url(LoginPage::PATH)));
        site.add_page(form(&url(FormPage::PATH), &base)?);
        site.add_page(drag_drop(&url(DragDropPage::PATH)));
        site.add_page(upload(&url(UploadPage::PATH)));
        site.add_page(
            MockPage::new(url(TextareaPage::PATH), "Textarea Demo").element(
                MockElement::new("comments", "textarea")
                    .kind(ElementKind::TextInput)
                    .matches(TextareaPage::comment_box()),
            ),
        );
        site.add_page(
            MockPage::new(url(HoverPage::PATH), "Tooltip Demo")
                .element(
                    MockElement::new("download", "a")
                        .matches(HoverPage::download_button())
                        .text("Download now")
                        .on_hover(|scope| scope.reveal("tooltip", "Download the latest release")),
                )
                .element(
                    MockElement::new("tooltip", "div")
                        .matches(HoverPage::tooltip())
                        .hidden(),
                ),
        );
        site.add_page(MockPage::new(url(CookieJar::PATH), "Cookie Handling Demo"));
        site.add_page(MockPage::new(url(HistoryPage::FIRST_PATH), "Welcome: Mercury Tours"));
        site.add_page(
            MockPage::new(url(HistoryPage::SECOND_PATH), "Register: Mercury Tours")
                .ready_after(LOAD_DELAY),
        );
        site.add_page(MockPage::new(url("/test/"), "Demo Site: DatePicker"));
        Ok(site)
    }
}

fn registration(url: &str, login_url: String) -> MockPage {
    MockPage::new(url, "Create an account")
        .element(MockElement::input("email").matches(RegistrationPage::email_field()))
        .element(MockElement::input("password").matches(RegistrationPage::password_field()))
        .element(MockElement::input("confirm").matches(RegistrationPage::confirm_field()))
        .element(MockElement::new("error", "div").hidden())
        .element(
            MockElement::new("submit", "button")
                .matches(RegistrationPage::submit_button())
                .text("Register")
                .on_click(move |scope| {
                    let email = scope.value_of("email");
                    let password = scope.value_of("password");
                    if password == scope.value_of("confirm")
                        && scope.register_account(&email, &password)
                    {
                        scope.navigate(login_url.clone());
                    } else {
                        scope.reveal("error", "Registration failed");
                    }
                }),
        )
}

fn login(url: &str, home_url: String) -> MockPage {
    MockPage::new(url, "Login - My Store")
        .ready_after(LOAD_DELAY)
        .element(MockElement::new("form", "form").matches(LoginPage::form()))
        .element(MockElement::input("email").matches(LoginPage::email_field()))
        .element(MockElement::input("passwd").matches(LoginPage::password_field()))
        .element(
            MockElement::new("submit", "button")
                .matches(LoginPage::submit_button())
                .on_click(move |scope| {
                    let email = scope.value_of("email");
                    if scope.authenticate(&email, &scope.value_of("passwd")) {
                        scope.set_identity(Some(email));
                        scope.navigate(home_url.clone());
                    } else {
                        scope.reveal("error", "Authentication failed.");
                    }
                }),
        )
        .element(
            MockElement::new("submit-label", "span")
                .matches(LoginPage::sign_in_label())
                .text(" Sign in "),
        )
        .element(
            MockElement::new("error", "div")
                .matches(LoginPage::error_banner())
                .hidden(),
        )
}

fn home(url: &str, login_url: String) -> MockPage {
    MockPage::new(url, "My account - My Store")
        .element(MockElement::new("identity", "span").matches(HomePage::identity_label()))
        .element(
            MockElement::new("logout", "a")
                .matches(HomePage::log_out_link())
                .text("Sign out")
                .on_click(move |scope| {
                    scope.set_identity(None);
                    scope.navigate(login_url.clone());
                }),
        )
        .on_load(|scope| {
            let identity = scope.identity().map(str::to_string);
            match identity {
                Some(email) => scope.reveal("identity", email),
                None => {
                    scope.remove("identity");
                    scope.remove("logout");
                }
            }
        })
}

fn form(url: &str, base: &str) -> ProbeResult<MockPage> {
    let mut page = MockPage::new(url, "Radio Button & Check Box Demo")
        .element(MockElement::new("navbar", "ul").matches(MenuPage::navbar()));

    for option in 1..=CHOICE_COUNT {
        page = page
            .element(
                MockElement::radio(format!("radio-{option}"), "vfb-7")
                    .matches(FormPage::single_choice(option)?),
            )
            .element(
                MockElement::checkbox(format!("check-{option}"))
                    .matches(FormPage::multi_choice(option)?),
            );
    }

    // The toggle sits under a sticky banner, so native clicks on it are intercepted.
    page = page
        .element(
            MockElement::new("menu-li", "li")
                .matches(MenuPage::menu_item(MENU))
                .attr("class", "dropdown"),
        )
        .element(
            MockElement::new("menu-toggle", "a")
                .matches(MenuPage::menu_toggle(MENU))
                .attr("class", "dropdown-toggle")
                .text(MENU)
                .obscured()
                .on_click(|scope| {
                    let open = scope
                        .attribute("menu-li", "class")
                        .is_some_and(|c| c.contains("open"));
                    let class = if open { "dropdown" } else { "dropdown open" };
                    scope.set_attribute("menu-li", "class", class);
                    for (index, _) in MENU_ENTRIES.iter().enumerate() {
                        if let Some(entry) = scope.element_mut(&format!("menu-entry-{index}")) {
                            entry.set_displayed(!open);
                        }
                    }
                }),
        );

    for (index, (label, path)) in MENU_ENTRIES.iter().enumerate() {
        let target = format!("{base}{path}");
        page = page.element(
            MockElement::new(format!("menu-entry-{index}"), "a")
                .matches(MenuPage::menu_option(label))
                .text(*label)
                .hidden()
                .on_click(move |scope| scope.navigate(target.clone())),
        );
    }
    Ok(page)
}

fn drag_drop(url: &str) -> MockPage {
    let sources = ["bank-block", "amount-block", "sales-block", "amount-block"];
    let mut page = MockPage::new(url, "Drag and Drop Demo")
        .element(
            MockElement::new("perfect", "a")
                .matches(DragDropPage::perfect_button())
                .hidden(),
        );

    let mut added = Vec::new();
    let moves = DragDropPage::moves().into_iter().zip(sources).enumerate();
    for (index, ((source, target), expected)) in moves {
        if !added.contains(&expected) {
            page = page.element(MockElement::new(expected, "a").matches(source));
            added.push(expected);
        }
        page = page.element(
            MockElement::new(format!("slot-{index}"), "li")
                .matches(target)
                .on_drop(move |scope| {
                    if scope.dragged() != Some(expected) {
                        return;
                    }
                    scope.set_attribute(&format!("slot-{index}"), "data-filled", "true");
                    let filled = (0..4).all(|i| {
                        scope.attribute(&format!("slot-{i}"), "data-filled").is_some()
                    });
                    if filled {
                        scope.reveal("perfect", "Perfect!");
                    }
                }),
        );
    }
    page
}

fn upload(url: &str) -> MockPage {
    MockPage::new(url, "File Upload Demo")
        .element(
            MockElement::new("file", "input")
                .kind(ElementKind::FileInput)
                .matches(UploadPage::file_input()),
        )
        .element(MockElement::checkbox("terms").matches(UploadPage::terms_checkbox()))
        .element(
            MockElement::new("submit", "button")
                .matches(UploadPage::submit_button())
                .on_click(|scope| {
                    if !scope.value_of("file").is_empty() && scope.is_selected("terms") {
                        scope.reveal("result", "1 file\nhas been successfully uploaded.");
                    } else {
                        scope.reveal("result", "Select a file and accept the terms first");
                    }
                }),
        )
        .element(
            MockElement::new("result", "h3")
                .matches(UploadPage::result_banner())
                .hidden(),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::AutomationDriver;
    use crate::interaction::Interactor;
    use crate::page::{PageBase, PageObject};
    use crate::wait::WaitOptions;

    const BASE: &str = "https://demo.test";

    fn base(driver: &dyn AutomationDriver) -> PageBase<'_> {
        PageBase::new(
            Interactor::with_options(driver, WaitOptions::new().with_timeout(300).with_poll_interval(5)),
            BASE,
        )
    }

    #[test]
    fn test_register_then_login_then_logout() {
        let site = MockSite::demo(BASE).unwrap();
        let driver = site.open_session();

        let registration = RegistrationPage::new(base(&driver));
        registration.open().unwrap();
        registration.register("u1@example.com", "pw").unwrap();
        assert!(site.has_account("u1@example.com"));

        let login = LoginPage::new(base(&driver));
        assert!(login.is_on_login_page().unwrap());
        login.log_in("u1@example.com", "pw").unwrap();

        let home = HomePage::new(base(&driver));
        assert!(home.is_logged_in().unwrap());
        assert_eq!(home.logged_in_identity().unwrap(), "u1@example.com");
        home.log_out().unwrap();
        assert!(!home.is_logged_in().unwrap());
        assert!(login.is_on_login_page().unwrap());
    }

    #[test]
    fn test_wrong_password_stays_on_login_page() {
        let site = MockSite::demo(BASE).unwrap();
        site.add_account("u1@example.com", "pw");
        let driver = site.open_session();
        let login = LoginPage::new(base(&driver));
        login.open().unwrap();
        login.log_in("u1@example.com", "nope").unwrap();
        assert!(login.is_on_login_page().unwrap());
        assert_eq!(
            login.error_message().unwrap().as_deref(),
            Some("Authentication failed.")
        );
    }

    #[test]
    fn test_menu_expands_and_navigates() {
        let driver = MockSite::demo(BASE).unwrap().open_session();
        let menu = MenuPage::new(base(&driver));
        menu.open().unwrap();
        assert!(!menu.is_expanded(MENU).unwrap());
        menu.expand(MENU).unwrap();
        assert!(menu.is_expanded(MENU).unwrap());
        menu.choose(MENU, "Drag and Drop").unwrap();
        assert!(driver.current_url().unwrap().ends_with(DragDropPage::PATH));
    }

    #[test]
    fn test_drag_drop_requires_every_move() {
        let driver = MockSite::demo(BASE).unwrap().open_session();
        let page = DragDropPage::new(base(&driver));
        page.open().unwrap();
        assert!(!page.is_perfect_displayed().unwrap());
        page.complete_all().unwrap();
        assert!(page.is_perfect_displayed().unwrap());
    }

    #[test]
    fn test_upload_reports_success() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let driver = MockSite::demo(BASE).unwrap().open_session();
        let page = UploadPage::new(base(&driver));
        page.open().unwrap();
        page.upload(file.path()).unwrap();
        assert!(page.is_upload_successful().unwrap());
    }

    #[test]
    fn test_tooltip_appears_on_hover() {
        let driver = MockSite::demo(BASE).unwrap().open_session();
        let page = HoverPage::new(base(&driver));
        page.open().unwrap();
        assert!(page.has_download_button().unwrap());
        assert!(!page.is_tooltip_visible().unwrap());
        page.hover_download_button().unwrap();
        assert!(page.is_tooltip_visible().unwrap());
        assert!(!page.tooltip_text().unwrap().is_empty());
    }
}
