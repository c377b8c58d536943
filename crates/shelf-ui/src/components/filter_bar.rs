use crate::themes::Theme;
use ratatui::text::{Line, Span};
use shelf_runtime::session::{DashboardSession, Selector};

/// Key hints shown under the selectors.
pub const HELP: &str = "Tab switch · ←/→ change · m month · g genre · a reset · q quit";

/// The two filter selectors, with the focused one highlighted.
///
/// Renders as `Month ◀ 03/2024 ▶ (2/3)   Genre ◀ All ▶ (1/4)` followed by a
/// line of key hints.
pub struct FilterBar<'a> {
    pub session: &'a DashboardSession,
    pub focused: Selector,
    pub theme: &'a Theme,
}

impl<'a> FilterBar<'a> {
    pub fn new(session: &'a DashboardSession, focused: Selector, theme: &'a Theme) -> Self {
        Self {
            session,
            focused,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mut spans = self.selector_spans(Selector::Month);
        spans.push(Span::raw("   "));
        spans.extend(self.selector_spans(Selector::Genre));

        vec![
            Line::from(spans),
            Line::from(Span::styled(HELP, self.theme.dim)),
        ]
    }

    fn selector_spans(&self, selector: Selector) -> Vec<Span<'a>> {
        let focused = selector == self.focused;
        let value_style = if focused {
            self.theme.selector_focused
        } else {
            self.theme.selector
        };
        let label_style = if focused {
            self.theme.bold
        } else {
            self.theme.label
        };
        let position = format!(
            " ({}/{})",
            self.session.selected_index(selector) + 1,
            self.session.options_for(selector).len()
        );

        vec![
            Span::styled(format!("{} ", selector.label()), label_style),
            Span::styled("◀ ", self.theme.dim),
            Span::styled(self.session.choice(selector).label().to_string(), value_style),
            Span::styled(" ▶", self.theme.dim),
            Span::styled(position, self.theme.dim),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shelf_core::models::{FilterSelection, ReadingRecord};
    use shelf_data::pipeline::RecordSet;
    use std::sync::Arc;

    fn session() -> DashboardSession {
        let records = vec![
            ReadingRecord {
                title: "A".to_string(),
                genre: "Fiction".to_string(),
                reader: "X".to_string(),
                completion_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            },
            ReadingRecord {
                title: "B".to_string(),
                genre: "Sci-Fi".to_string(),
                reader: "Y".to_string(),
                completion_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            },
        ];
        DashboardSession::new(
            Arc::new(RecordSet::from_records(records)),
            &FilterSelection::default(),
        )
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_filter_bar_shows_both_selectors() {
        let theme = Theme::dark();
        let session = session();
        let lines = FilterBar::new(&session, Selector::Month, &theme).to_lines();
        assert_eq!(lines.len(), 2);
        let bar = text(&lines[0]);
        assert!(bar.contains("Month ◀ All ▶ (1/3)"), "got: {bar}");
        assert!(bar.contains("Genre ◀ All ▶ (1/3)"), "got: {bar}");
        assert_eq!(text(&lines[1]), HELP);
    }

    #[test]
    fn test_filter_bar_highlights_focused_selector() {
        let theme = Theme::dark();
        let mut session = session();
        session.cycle(Selector::Genre, true);
        let lines = FilterBar::new(&session, Selector::Genre, &theme).to_lines();

        let genre_value = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "Fiction")
            .expect("genre value span");
        assert_eq!(genre_value.style, theme.selector_focused);

        let month_value = &lines[0].spans[2];
        assert_eq!(month_value.content, "All");
        assert_eq!(month_value.style, theme.selector);
    }
}
