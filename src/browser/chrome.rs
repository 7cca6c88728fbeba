//! Live headless Chrome session.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use super::PageSession;
use crate::error::{AppError, Result};
use crate::models::BrowserConfig;
use crate::utils::normalize_ws;

const SELECT_BY_VALUE_JS: &str = "function(value) { \
    this.value = value; \
    this.dispatchEvent(new Event('change', { bubbles: true })); \
}";

/// Page session driving a single Chrome tab.
pub struct ChromeSession {
    // Dropping the browser closes the process, so it must outlive the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    /// Launch Chrome, open a tab and navigate to `url`.
    pub fn launch(config: &BrowserConfig, url: &str, timeout: Duration) -> Result<Self> {
        let args: Vec<&OsStr> = config.args.iter().map(OsStr::new).collect();
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(!config.args.iter().any(|a| a == "--no-sandbox"))
            .args(args)
            .build()
            .map_err(AppError::browser)?;

        let browser = Browser::new(options).map_err(AppError::browser)?;
        let tab = browser.new_tab().map_err(AppError::browser)?;
        tab.set_default_timeout(timeout);

        log::info!("Navigating to {}", url);
        tab.navigate_to(url)
            .map_err(AppError::browser)?
            .wait_until_navigated()
            .map_err(AppError::browser)?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl PageSession for ChromeSession {
    type Element<'a> = Element<'a>;

    fn find_first(&self, selector: &str) -> Result<Element<'_>> {
        self.tab
            .find_element(selector)
            .map_err(|e| AppError::structure_not_found(selector, e))
    }

    fn find_within<'a>(&'a self, parent: &Element<'a>, selector: &str) -> Result<Vec<Element<'a>>> {
        // No match is an empty list; an error means the parent is gone or
        // the connection failed.
        parent
            .find_elements(selector)
            .map_err(|e| query_error(selector, e))
    }

    fn text(&self, element: &Element<'_>) -> Result<String> {
        element
            .get_inner_text()
            .map(|text| cell_text(&text))
            .map_err(AppError::browser)
    }

    fn attribute(&self, element: &Element<'_>, name: &str) -> Result<Option<String>> {
        element.get_attribute_value(name).map_err(AppError::browser)
    }

    fn click(&self, element: &Element<'_>) -> Result<()> {
        element.click().map(|_| ()).map_err(AppError::browser)
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|e| AppError::structure_not_found(selector, e))
    }

    fn select_value(&self, selector: &str, value: &str) -> Result<()> {
        let select = self.find_first(selector)?;
        select
            .call_js_fn(
                SELECT_BY_VALUE_JS,
                vec![serde_json::Value::String(value.to_string())],
                false,
            )
            .map_err(AppError::browser)?;
        log::debug!("Selected {}={}", selector, value);
        Ok(())
    }
}

/// Whitespace-collapsed `innerText`, matching what snapshot sessions report.
fn cell_text(inner_text: &str) -> String {
    normalize_ws(inner_text)
}

/// Classify a failed descendant query.
///
/// `NoElementFound` here means the parent node was detached mid-read.
fn query_error(selector: &str, error: anyhow::Error) -> AppError {
    if error.downcast_ref::<NoElementFound>().is_some() {
        AppError::structure_not_found(selector, "parent element detached during read")
    } else {
        AppError::browser(format!("query '{selector}' failed: {error}"))
    }
}
