//! Text normalization for scraped cells.
//!
//! Cell text reaches us as Rust strings, so it is already valid UTF-8; what
//! remains is the invisible debris browsers leave behind (BOMs, zero-width
//! joiners, non-breaking spaces, stray control characters).

use crate::error::{AppError, Result};
use crate::models::{FullTable, TabularFrame};

/// Strictly decode raw bytes as UTF-8.
pub fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| {
        AppError::encoding(format!(
            "invalid UTF-8 at byte {}",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Canonical form of a cell value. Idempotent.
pub fn normalize_text(s: &str) -> String {
    s.chars().filter_map(canonical_char).collect()
}

fn canonical_char(ch: char) -> Option<char> {
    match ch {
        '\u{feff}' | '\u{200b}' | '\u{200c}' | '\u{200d}' | '\u{2060}' => None,
        '\u{00a0}' | '\u{2007}' | '\u{202f}' => Some(' '),
        '\n' | '\t' => Some(ch),
        c if c.is_control() => None,
        c => Some(c),
    }
}

/// Coerce the scraped rows into a frame and normalize every present value.
pub fn normalize_frame(table: &FullTable) -> TabularFrame {
    TabularFrame::from_records(&table.rows).map_values(normalize_text)
}
