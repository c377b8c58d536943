use crate::themes::Theme;
use ratatui::text::{Line, Span};
use shelf_core::formatting::pluralize;

/// Decoration placed either side of the application title.
pub const ORNAMENT: &str = "❦";

/// Width of the separator under the title.
const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with ornaments (ALL CAPS).
/// 2. A 60-column `─` separator.
/// 3. Source and record count in `[ source | N records ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Human-readable description of the record source.
    pub source: &'a str,
    /// Number of records in the loaded set.
    pub record_count: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(source: &'a str, record_count: usize, theme: &'a Theme) -> Self {
        Self {
            source,
            record_count,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(vec![
                Span::styled(ORNAMENT, self.theme.header_accent),
                Span::styled(" READING ANALYTICS ", self.theme.header),
                Span::styled(ORNAMENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(
                "─".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    pluralize(self.record_count as u64, "record", "records"),
                    self.theme.value,
                ),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
