use crate::themes::Theme;
use ratatui::text::{Line, Span};
use shelf_core::formatting::pluralize;
use shelf_core::models::CountRow;

/// Bullet prepended to every leaderboard name.
pub const BULLET: &str = "•";

/// Plain-text ranking: one `•name` line per row, count dimmed after it.
pub struct Leaderboard<'a> {
    pub rows: &'a [CountRow],
    pub theme: &'a Theme,
}

impl<'a> Leaderboard<'a> {
    pub fn new(rows: &'a [CountRow], theme: &'a Theme) -> Self {
        Self { rows, theme }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        self.rows
            .iter()
            .map(|row| {
                Line::from(vec![
                    Span::styled(BULLET, self.theme.header_accent),
                    Span::styled(row.label.as_str(), self.theme.value),
                    Span::styled(
                        format!("  {}", pluralize(row.count, "book", "books")),
                        self.theme.dim,
                    ),
                ])
            })
            .collect()
    }
}
