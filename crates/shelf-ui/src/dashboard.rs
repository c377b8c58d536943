//! Full-screen dashboard layout.
//!
//! ```text
//! header
//! filter bar
//! ┌ Top 5 Readers ────────┐┌ Readings by Genre ────┐
//! └───────────────────────┘└───────────────────────┘
//! ┌ Books Read per Month ─┐┌ Top 5 Most Read Books ┐
//! └───────────────────────┘└───────────────────────┘
//! ┌ Books Read per Genre by Reader ────────────────┐
//! └────────────────────────────────────────────────┘
//! status line
//! ```

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};

use shelf_core::formatting::format_count;
use shelf_core::models::{AggregateView, ViewKind};
use shelf_data::analysis::FilteredViews;
use shelf_runtime::session::{DashboardSession, Selector};

use crate::charts::{self, GenreColors};
use crate::components::filter_bar::FilterBar;
use crate::components::header::Header;
use crate::themes::Theme;

/// Colours for every genre in the loaded set, in option order.
pub fn genre_colors(session: &DashboardSession) -> GenreColors {
    GenreColors::new(
        session
            .options()
            .genres
            .iter()
            .filter(|c| !c.is_all())
            .map(|c| c.label().to_string()),
    )
}

/// Draw the whole dashboard for the session's current selection.
pub fn render_dashboard(
    frame: &mut Frame,
    session: &DashboardSession,
    source: &str,
    focused: Selector,
    theme: &Theme,
) {
    let area = frame.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(2),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Header::new(source, session.records().len(), theme);
    frame.render_widget(Paragraph::new(Text::from(header.to_lines())), rows[0]);

    let filter_bar = FilterBar::new(session, focused, theme);
    frame.render_widget(Paragraph::new(Text::from(filter_bar.to_lines())), rows[1]);

    let colors = genre_colors(session);
    let analysis = session.analysis();
    let all_time = &analysis.all_time;

    let top = halves(rows[2]);
    draw_view(frame, top[0], &all_time.top_readers, &colors, theme);
    draw_filtered(frame, top[1], &analysis.filtered, ViewKind::GenreCounts, &colors, theme);

    let middle = halves(rows[3]);
    draw_view(frame, middle[0], &all_time.monthly_counts, &colors, theme);
    draw_filtered(frame, middle[1], &analysis.filtered, ViewKind::TopBooks, &colors, theme);

    draw_view(frame, rows[4], &all_time.reader_genre_matrix, &colors, theme);

    frame.render_widget(Paragraph::new(status_line(session, theme)), rows[5]);
}

fn halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn draw_view(
    frame: &mut Frame,
    area: Rect,
    view: &AggregateView,
    colors: &GenreColors,
    theme: &Theme,
) {
    charts::render_view(frame, area, view, view.default_chart(), colors, theme);
}

fn draw_filtered(
    frame: &mut Frame,
    area: Rect,
    filtered: &FilteredViews,
    kind: ViewKind,
    colors: &GenreColors,
    theme: &Theme,
) {
    match filtered {
        FilteredViews::NoData => charts::render_no_data(frame, area, kind.title(), theme),
        FilteredViews::Views {
            genre_counts,
            top_books,
            ..
        } => {
            let view = if kind == ViewKind::TopBooks {
                top_books
            } else {
                genre_counts
            };
            draw_view(frame, area, view, colors, theme);
        }
    }
}

/// `N of M records match` plus a warning when the filters matched nothing.
pub fn status_line<'a>(session: &DashboardSession, theme: &'a Theme) -> Line<'a> {
    let meta = &session.analysis().metadata;
    let mut spans = vec![Span::styled(
        format!(
            "{} of {} records match",
            format_count(meta.records_matched as u64),
            format_count(meta.records_processed as u64)
        ),
        theme.info,
    )];
    if session.analysis().filtered.is_no_data() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("no data for selected filters", theme.warning));
    }
    Line::from(spans)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
