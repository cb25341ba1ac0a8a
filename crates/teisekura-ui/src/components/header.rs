use crate::themes::Theme;
use chrono::NaiveDate;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Application title.
pub const TITLE: &str = "TEISĖKŪRA LIETUVOS RESPUBLIKOS SEIME";

/// Marks placed either side of the title.
pub const ORNAMENT: &str = "§";

/// Dashboard header rendering four lines:
///
/// 1. Application title between ornaments.
/// 2. A `=` separator as wide as the title line.
/// 3. Cutoff date and data source in `[ iki YYYY-MM-DD | source ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Upper bound on effective date of the loaded data.
    pub cutoff: NaiveDate,
    /// Where the data came from (URL or file path).
    pub source: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(cutoff: NaiveDate, source: &'a str, theme: &'a Theme) -> Self {
        Self {
            cutoff,
            source,
            theme,
        }
    }

    fn title_text() -> String {
        format!("{ORNAMENT} {TITLE} {ORNAMENT}")
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(Self::title_text().width());

        vec![
            Line::from(vec![
                Span::styled(ORNAMENT, self.theme.separator),
                Span::styled(format!(" {TITLE} "), self.theme.header),
                Span::styled(ORNAMENT, self.theme.separator),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ iki ", self.theme.label),
                Span::styled(self.cutoff.format("%Y-%m-%d").to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.source, self.theme.dim),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
