//! Static HTML snapshot session.
//!
//! Replays a sequence of saved pages: clicking any element moves to the
//! next snapshot, the way the pagination control moves the live table.

use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use super::PageSession;
use crate::error::{AppError, Result};
use crate::services::normalizer::decode_utf8;
use crate::utils::normalize_ws;

/// Page session backed by parsed HTML documents.
pub struct HtmlSession {
    pages: Vec<Html>,
    current: Cell<usize>,
}

impl HtmlSession {
    /// Create a session from HTML sources, one per page.
    pub fn from_pages<S: AsRef<str>>(pages: &[S]) -> Result<Self> {
        if pages.is_empty() {
            return Err(AppError::config("At least one HTML snapshot is required"));
        }
        Ok(Self {
            pages: pages
                .iter()
                .map(|page| Html::parse_document(page.as_ref()))
                .collect(),
            current: Cell::new(0),
        })
    }

    /// Load snapshots from files, in the given order.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = std::fs::read(path)?;
            let text = decode_utf8(&bytes).map_err(|e| match e {
                AppError::Encoding(msg) => {
                    AppError::encoding(format!("{}: {}", path.as_ref().display(), msg))
                }
                other => other,
            })?;
            sources.push(text);
        }
        Self::from_pages(&sources)
    }

    /// Index of the snapshot currently displayed.
    pub fn current_page(&self) -> usize {
        self.current.get()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn document(&self) -> &Html {
        &self.pages[self.current.get()]
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

impl PageSession for HtmlSession {
    type Element<'a> = ElementRef<'a>;

    fn find_first(&self, selector: &str) -> Result<ElementRef<'_>> {
        let sel = Self::parse_selector(selector)?;
        self.document().select(&sel).next().ok_or_else(|| {
            AppError::structure_not_found(
                selector,
                format!("absent from snapshot {}", self.current.get() + 1),
            )
        })
    }

    fn find_within<'a>(
        &'a self,
        parent: &ElementRef<'a>,
        selector: &str,
    ) -> Result<Vec<ElementRef<'a>>> {
        let sel = Self::parse_selector(selector)?;
        Ok(parent.select(&sel).collect())
    }

    fn text(&self, element: &ElementRef<'_>) -> Result<String> {
        let raw: String = element.text().collect();
        Ok(normalize_ws(&raw))
    }

    fn attribute(&self, element: &ElementRef<'_>, name: &str) -> Result<Option<String>> {
        Ok(element.value().attr(name).map(str::to_string))
    }

    fn click(&self, _element: &ElementRef<'_>) -> Result<()> {
        let next = self.current.get() + 1;
        if next >= self.pages.len() {
            return Err(AppError::browser(format!(
                "No snapshot after page {}",
                self.pages.len()
            )));
        }
        self.current.set(next);
        log::debug!("Snapshot session moved to page {}", next + 1);
        Ok(())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<()> {
        self.find_first(selector).map(|_| ())
    }

    fn select_value(&self, selector: &str, value: &str) -> Result<()> {
        let select = self.find_first(selector)?;
        let has_option = self
            .find_within(&select, "option")?
            .iter()
            .any(|option| option.value().attr("value") == Some(value));

        if has_option {
            log::debug!("Snapshot already rendered with {}={}", selector, value);
            Ok(())
        } else {
            Err(AppError::structure_not_found(
                selector,
                format!("no option with value '{value}'"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <select id="segment"><option value="1">Código</option><option value="2">Setor</option></select>
        <table>
          <tr><th>Setor</th><th> Código </th></tr>
          <tr><td>Financeiro   e
              Outros</td><td>ITUB4</td></tr>
        </table>
        <li class="pagination-next disabled"><a>Próxima</a></li>
    "#;

    #[test]
    fn test_requires_a_page() {
        let pages: [&str; 0] = [];
        assert!(HtmlSession::from_pages(&pages).is_err());
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let session = HtmlSession::from_pages(&[PAGE]).unwrap();
        let table = session.find_first("table").unwrap();
        let cells = session.find_within(&table, "td").unwrap();
        let texts: Vec<String> = cells.iter().map(|c| session.text(c).unwrap()).collect();
        assert_eq!(texts, vec!["Financeiro e Outros", "ITUB4"]);
    }

    #[test]
    fn test_missing_element_is_structure_error() {
        let session = HtmlSession::from_pages(&[PAGE]).unwrap();
        let err = session.find_first("#ranking").unwrap_err();
        assert!(matches!(err, AppError::StructureNotFound { .. }));
    }

    #[test]
    fn test_attribute() {
        let session = HtmlSession::from_pages(&[PAGE]).unwrap();
        let next = session.find_first(".pagination-next").unwrap();
        assert_eq!(
            session.attribute(&next, "class").unwrap().as_deref(),
            Some("pagination-next disabled")
        );
        assert_eq!(session.attribute(&next, "href").unwrap(), None);
    }

    #[test]
    fn test_click_advances_until_last_snapshot() {
        let session = HtmlSession::from_pages(&[PAGE, PAGE]).unwrap();
        let next = session.find_first(".pagination-next").unwrap();
        session.click(&next).unwrap();
        assert_eq!(session.current_page(), 1);
        assert!(session.click(&next).is_err());
    }

    #[test]
    fn test_select_value_checks_options() {
        let session = HtmlSession::from_pages(&[PAGE]).unwrap();
        assert!(session.select_value("#segment", "2").is_ok());
        assert!(session.select_value("#segment", "9").is_err());
    }

    #[test]
    fn test_from_files_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page1.html");
        std::fs::write(&path, [0x3c, 0x70, 0x3e, 0xff, 0xfe]).unwrap();

        let err = HtmlSession::from_files(&[path]).err().unwrap();
        assert!(matches!(err, AppError::Encoding(_)));
    }
}
