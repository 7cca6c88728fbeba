//! Pagination control.
//!
//! The live table re-renders in place after the control is clicked, so the
//! old table stays in the DOM for a while. Page changes are detected by the
//! table text changing, not by the table being present.

use std::thread;
use std::time::{Duration, Instant};

use crate::browser::PageSession;
use crate::error::{AppError, Result};
use crate::models::{ScrapeConfig, SelectorConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Moves the table to its next page.
#[derive(Debug, Clone)]
pub struct Pager {
    control: String,
    disabled_marker: String,
    ready_selector: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl Pager {
    pub fn new(selectors: &SelectorConfig, scraper: &ScrapeConfig) -> Self {
        Self {
            control: selectors.pagination_next.clone(),
            disabled_marker: selectors.disabled_marker.clone(),
            ready_selector: selectors.table.clone(),
            timeout: scraper.page_ready_timeout(),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Replace the time allowed for the next page to render.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.poll_interval = self.poll_interval.min(timeout);
        self
    }

    /// Advance to the next page.
    ///
    /// Returns `false` without touching the page when the control carries
    /// the disabled marker, which is how the last page is signalled.
    /// Otherwise clicks and blocks until the table content differs from the
    /// page it left, failing with `StructureNotFound` after the timeout.
    pub fn advance<S: PageSession>(&self, session: &S) -> Result<bool> {
        let control = session.find_first(&self.control)?;
        let class = session.attribute(&control, "class")?.unwrap_or_default();

        if self.is_disabled(&class) {
            log::debug!("Pagination control disabled: no more pages");
            return Ok(false);
        }

        let previous = self.fingerprint(session)?;
        session.click(&control)?;
        self.wait_for_change(session, previous.as_deref())?;
        Ok(true)
    }

    /// Text of the table, or `None` while no table is rendered.
    fn fingerprint<S: PageSession>(&self, session: &S) -> Result<Option<String>> {
        match session.find_first(&self.ready_selector) {
            Ok(table) => session.text(&table).map(Some),
            Err(AppError::StructureNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn wait_for_change<S: PageSession>(&self, session: &S, previous: Option<&str>) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(current) = self.fingerprint(session)? {
                if previous != Some(current.as_str()) {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(AppError::structure_not_found(
                    &self.ready_selector,
                    format!(
                        "after page change: no new table within {:?}",
                        self.timeout
                    ),
                ));
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn is_disabled(&self, class: &str) -> bool {
        class
            .split_whitespace()
            .any(|token| token == self.disabled_marker)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use scraper::ElementRef;

    use super::*;
    use crate::browser::HtmlSession;

    fn pager() -> Pager {
        Pager::new(&SelectorConfig::default(), &ScrapeConfig::default())
            .with_timeout(Duration::from_millis(300))
    }

    fn page(code: &str, control_class: &str) -> String {
        format!(
            r#"<table><tr><td>{code}</td></tr></table>
               <ul><li class="{control_class}"><a>›</a></li></ul>"#
        )
    }

    /// Snapshot session whose clicks only take effect after `delay`, like a
    /// table that reloads in the background.
    struct LaggingSession {
        inner: HtmlSession,
        delay: Duration,
        pending: Cell<Option<Instant>>,
    }

    impl LaggingSession {
        fn new(pages: &[String], delay: Duration) -> Self {
            Self {
                inner: HtmlSession::from_pages(pages).unwrap(),
                delay,
                pending: Cell::new(None),
            }
        }

        fn settle(&self) -> Result<()> {
            if let Some(at) = self.pending.get() {
                if Instant::now() >= at {
                    self.pending.set(None);
                    let any = self.inner.find_first("ul")?;
                    self.inner.click(&any)?;
                }
            }
            Ok(())
        }
    }

    impl PageSession for LaggingSession {
        type Element<'a> = ElementRef<'a>;

        fn find_first(&self, selector: &str) -> Result<ElementRef<'_>> {
            self.settle()?;
            self.inner.find_first(selector)
        }

        fn find_within<'a>(
            &'a self,
            parent: &ElementRef<'a>,
            selector: &str,
        ) -> Result<Vec<ElementRef<'a>>> {
            self.inner.find_within(parent, selector)
        }

        fn text(&self, element: &ElementRef<'_>) -> Result<String> {
            self.inner.text(element)
        }

        fn attribute(&self, element: &ElementRef<'_>, name: &str) -> Result<Option<String>> {
            self.inner.attribute(element, name)
        }

        fn click(&self, _element: &ElementRef<'_>) -> Result<()> {
            if self.pending.get().is_none() {
                self.pending.set(Some(Instant::now() + self.delay));
            }
            Ok(())
        }

        fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
            self.settle()?;
            self.inner.wait_for(selector, timeout)
        }

        fn select_value(&self, selector: &str, value: &str) -> Result<()> {
            self.inner.select_value(selector, value)
        }
    }

    #[test]
    fn test_disabled_control_ends_pagination() {
        let session =
            HtmlSession::from_pages(&[page("PETR4", "pagination-next disabled")]).unwrap();
        assert!(!pager().advance(&session).unwrap());
        assert_eq!(session.current_page(), 0);
    }

    #[test]
    fn test_enabled_control_advances() {
        let session = HtmlSession::from_pages(&[
            page("PETR4", "pagination-next"),
            page("VALE3", "pagination-next disabled"),
        ])
        .unwrap();
        assert!(pager().advance(&session).unwrap());
        assert_eq!(session.current_page(), 1);
        assert!(!pager().advance(&session).unwrap());
    }

    #[test]
    fn test_waits_for_delayed_page_change() {
        let session = LaggingSession::new(
            &[
                page("PETR4", "pagination-next"),
                page("VALE3", "pagination-next disabled"),
            ],
            Duration::from_millis(50),
        );

        assert!(pager().advance(&session).unwrap());
        assert_eq!(session.inner.current_page(), 1);

        let table = session.find_first("table").unwrap();
        assert_eq!(session.text(&table).unwrap(), "VALE3");
        assert!(!pager().advance(&session).unwrap());
    }

    #[test]
    fn test_page_that_never_changes_times_out() {
        let session = LaggingSession::new(
            &[
                page("PETR4", "pagination-next"),
                page("VALE3", "pagination-next disabled"),
            ],
            Duration::from_secs(60),
        );

        let err = pager().advance(&session).unwrap_err();
        assert!(matches!(err, AppError::StructureNotFound { ref selector, .. } if selector == "table"));
        assert_eq!(session.inner.current_page(), 0);
    }

    #[test]
    fn test_marker_matches_whole_class_token() {
        let pager = pager();
        assert!(pager.is_disabled("pagination-next disabled"));
        assert!(!pager.is_disabled("pagination-next not-disabled"));
        assert!(!pager.is_disabled(""));
    }

    #[test]
    fn test_missing_control_is_structure_error() {
        let session = HtmlSession::from_pages(&["<table></table>"]).unwrap();
        let err = pager().advance(&session).unwrap_err();
        assert!(matches!(err, AppError::StructureNotFound { .. }));
    }

    #[test]
    fn test_next_page_without_table_fails() {
        let session = HtmlSession::from_pages(&[
            page("PETR4", "pagination-next"),
            "<p>Erro</p>".to_string(),
        ])
        .unwrap();
        let err = pager().advance(&session).unwrap_err();
        assert!(err.to_string().contains("after page change"));
    }
}
