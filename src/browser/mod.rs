//! Browser automation boundary.
//!
//! The table reader and pager only talk to a page through [`PageSession`].
//! Two implementations exist:
//! - `ChromeSession`: a live headless Chrome tab (feature `chrome`)
//! - [`HtmlSession`]: a replay of saved HTML snapshots, one per page

#[cfg(feature = "chrome")]
mod chrome;
mod html;

use std::time::Duration;

use crate::error::Result;

#[cfg(feature = "chrome")]
pub use chrome::ChromeSession;
pub use html::HtmlSession;

/// A rendered page that can be queried and driven.
pub trait PageSession {
    /// Handle to an element of the current page.
    type Element<'a>
    where
        Self: 'a;

    /// First element matching `selector`, or `StructureNotFound`.
    fn find_first(&self, selector: &str) -> Result<Self::Element<'_>>;

    /// All descendants of `parent` matching `selector`.
    fn find_within<'a>(
        &'a self,
        parent: &Self::Element<'a>,
        selector: &str,
    ) -> Result<Vec<Self::Element<'a>>>;

    /// Rendered text of an element.
    fn text(&self, element: &Self::Element<'_>) -> Result<String>;

    fn attribute(&self, element: &Self::Element<'_>, name: &str) -> Result<Option<String>>;

    fn click(&self, element: &Self::Element<'_>) -> Result<()>;

    /// Block until `selector` is present, failing with `StructureNotFound` after `timeout`.
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Choose the `<option>` with `value` in the `<select>` matched by `selector`.
    fn select_value(&self, selector: &str, value: &str) -> Result<()>;
}
