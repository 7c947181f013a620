//! Locator abstraction for element selection.
//!
//! A [`Locator`] is the page-owned, immutable description of how to find an
//! element. Locators never hold live DOM references; resolution happens on
//! every interaction so a locator stays valid across navigations.

use serde::{Deserialize, Serialize};

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Element id attribute
    Id(String),
    /// Element name attribute
    Name(String),
    /// Anchor whose visible text equals the value
    LinkText(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a name selector
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a link text selector
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Strategy name, matching WebDriver's `using` values
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css selector",
            Self::XPath(_) => "xpath",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::LinkText(_) => "link text",
        }
    }

    /// Raw selector value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v) | Self::XPath(v) | Self::Id(v) | Self::Name(v) | Self::LinkText(v) => v,
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::Id(id) => format!("document.getElementById({id:?})"),
            Self::Name(name) => format!("document.getElementsByName({name:?})[0] || null"),
            Self::LinkText(text) => {
                format!("Array.from(document.querySelectorAll('a')).find(el => el.textContent.trim() === {text:?}) || null")
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// A named element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
    description: Option<String>,
}

impl Locator {
    /// Create a locator from a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            description: None,
        }
    }

    /// Locate by id attribute
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::id(id))
    }

    /// Locate by XPath
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::from_selector(Selector::xpath(expr))
    }

    /// Locate by CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::css(selector))
    }

    /// Locate by name attribute
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::from_selector(Selector::name(name))
    }

    /// Locate by link text
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::link_text(text))
    }

    /// Attach a human-readable description used in errors and logs
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Description for errors and logs
    #[must_use]
    pub fn description(&self) -> String {
        match &self.description {
            Some(d) => format!("{d} ({})", self.selector),
            None => self.selector.to_string(),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_query() {
            let query = Selector::css("button.primary").to_query();
            assert_eq!(query, "document.querySelector(\"button.primary\")");
        }

        #[test]
        fn test_xpath_query() {
            let query = Selector::xpath("//form[@id='login_form']").to_query();
            assert!(query.contains("document.evaluate"));
            assert!(query.contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_id_and_name_queries() {
            assert!(Selector::id("email").to_query().contains("getElementById"));
            assert!(Selector::name("passwd")
                .to_query()
                .contains("getElementsByName"));
        }

        #[test]
        fn test_link_text_query_trims() {
            let query = Selector::link_text("Sign out").to_query();
            assert!(query.contains("textContent.trim()"));
        }

        #[test]
        fn test_strategy_names() {
            assert_eq!(Selector::css("a").strategy(), "css selector");
            assert_eq!(Selector::xpath("//a").strategy(), "xpath");
            assert_eq!(Selector::id("a").strategy(), "id");
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::id("email").to_string(), "id=email");
        }

        #[test]
        fn test_serde_shape() {
            let json = serde_json::to_string(&Selector::id("email")).unwrap();
            assert_eq!(json, r#"{"by":"id","value":"email"}"#);
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_description_without_label() {
            let locator = Locator::id("vfb-7-1");
            assert_eq!(locator.description(), "id=vfb-7-1");
        }

        #[test]
        fn test_description_with_label() {
            let locator = Locator::id("SubmitLogin").described("sign-in button");
            assert_eq!(locator.description(), "sign-in button (id=SubmitLogin)");
        }

        #[test]
        fn test_new_is_css() {
            let locator = Locator::new(".navbar-nav");
            assert_eq!(locator.selector(), &Selector::css(".navbar-nav"));
        }

        #[test]
        fn test_equality_ignores_nothing() {
            assert_ne!(
                Locator::id("a"),
                Locator::id("a").described("label")
            );
            assert_eq!(Locator::id("a"), Locator::from(Selector::id("a")));
        }
    }
}
