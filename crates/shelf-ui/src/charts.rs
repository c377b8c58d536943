//! Chart renderers for the aggregate views.
//!
//! [`render_view`] draws one [`AggregateView`] as the requested
//! [`ChartKind`] inside a bordered panel.  Renderers only lay out what the
//! view already contains; no counting or sorting happens here.

use chrono::Datelike;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use shelf_core::formatting::format_count;
use shelf_core::models::{AggregateView, ChartKind, MonthlyCount, ReaderGenreCount};
use shelf_core::time_utils::month_label;

use crate::components::leaderboard::Leaderboard;
use crate::components::legend::{segment_widths, Legend, LegendEntry, ProportionStrip, FILLED};
use crate::themes::Theme;

/// Message shown in place of the filtered charts when nothing matches.
pub const NO_DATA_MESSAGE: &str = "No data for the selected filters.";

// ── GenreColors ───────────────────────────────────────────────────────────────

/// Maps genres to palette slots by their position in the genre selector,
/// so a genre keeps its colour across charts and filter changes.
#[derive(Debug, Clone, Default)]
pub struct GenreColors {
    genres: Vec<String>,
}

impl GenreColors {
    pub fn new<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genres: genres.into_iter().map(Into::into).collect(),
        }
    }

    /// Colour of `genre`; unknown genres take the slot after the known ones.
    pub fn color(&self, genre: &str, theme: &Theme) -> Color {
        let index = self
            .genres
            .iter()
            .position(|g| g == genre)
            .unwrap_or(self.genres.len());
        theme.series_color(index)
    }

    /// Known genres in palette order.
    pub fn genres(&self) -> &[String] {
        &self.genres
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Draw `view` as `kind` into `area`.
///
/// A stacked bar needs the reader/genre matrix; for other views it falls back
/// to a plain bar chart.
pub fn render_view(
    frame: &mut Frame,
    area: Rect,
    view: &AggregateView,
    kind: ChartKind,
    colors: &GenreColors,
    theme: &Theme,
) {
    let block = panel_block(view.title(), theme);
    if view.is_empty() {
        let text = Text::from(Line::from(Span::styled("Nothing to show yet.", theme.dim)));
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    match (kind, view) {
        (ChartKind::StackedBar, AggregateView::ReaderGenreMatrix(cells)) => {
            render_stacked(frame, area, block, cells, colors, theme)
        }
        (ChartKind::Line, AggregateView::MonthlyCounts(points)) => {
            render_line(frame, area, block, points, theme)
        }
        (ChartKind::Line, _) => {
            // Non-temporal views are plotted against their position.
            let points = series(view)
                .into_iter()
                .enumerate()
                .map(|(i, (label, count))| (i as f64, count as f64, label))
                .collect::<Vec<_>>();
            render_line_points(frame, area, block, &points, theme)
        }
        (ChartKind::Pie, _) => {
            render_pie(frame, area, block, &entries(view, colors, theme), theme)
        }
        (ChartKind::List, _) => render_list(frame, area, block, view, theme),
        (ChartKind::Bar | ChartKind::StackedBar, _) => {
            render_bars(frame, area, block, &series(view), theme)
        }
    }
}

/// Draw the "no data" notice used for filtered views on an empty selection.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(NO_DATA_MESSAGE, theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'a' to reset the filters.", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .block(panel_block(title, theme))
            .wrap(Wrap { trim: true }),
        area,
    );
}

// ── Data shaping ──────────────────────────────────────────────────────────────

/// Flatten any view into `(label, count)` pairs, keeping its order.
pub fn series(view: &AggregateView) -> Vec<(String, u64)> {
    match view {
        AggregateView::GenreCounts(rows)
        | AggregateView::TopBooks(rows)
        | AggregateView::TopReaders(rows) => {
            rows.iter().map(|r| (r.label.clone(), r.count)).collect()
        }
        AggregateView::MonthlyCounts(points) => points
            .iter()
            .map(|p| (month_label(p.month), p.count))
            .collect(),
        AggregateView::ReaderGenreMatrix(cells) => cells
            .iter()
            .map(|c| (format!("{} / {}", c.reader, c.genre), c.count))
            .collect(),
    }
}

/// Legend entries for `view`; genre views use the shared genre colours.
fn entries(view: &AggregateView, colors: &GenreColors, theme: &Theme) -> Vec<LegendEntry> {
    let by_genre = matches!(view, AggregateView::GenreCounts(_));
    series(view)
        .into_iter()
        .enumerate()
        .map(|(i, (label, count))| LegendEntry {
            color: if by_genre {
                colors.color(&label, theme)
            } else {
                theme.series_color(i)
            },
            label,
            count,
        })
        .collect()
}

/// Pad or truncate `label` to exactly `width` terminal columns.
pub fn fit_label(label: &str, width: usize) -> String {
    if label.width() <= width {
        let padding = width - label.width();
        return format!("{label}{}", " ".repeat(padding));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Renderers ─────────────────────────────────────────────────────────────────

fn panel_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(format!(" {title} "), theme.panel_title))
}

/// Column width for the labels of a bar-style chart.
fn label_column(labels: impl Iterator<Item = usize>, inner_width: u16) -> usize {
    let longest = labels.max().unwrap_or(0);
    longest.min(inner_width as usize / 3).max(1)
}

fn render_bars(frame: &mut Frame, area: Rect, block: Block, rows: &[(String, u64)], theme: &Theme) {
    let inner_width = block.inner(area).width;
    let label_w = label_column(rows.iter().map(|(l, _)| l.width()), inner_width);
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let value_w = format_count(max).len();
    let bar_w = (inner_width as usize).saturating_sub(label_w + value_w + 3);

    let lines: Vec<Line> = rows
        .iter()
        .map(|(label, count)| {
            let filled = (*count as f64 / max as f64 * bar_w as f64).round() as usize;
            let filled = if *count > 0 { filled.max(1) } else { 0 };
            Line::from(vec![
                Span::styled(fit_label(label, label_w), theme.label),
                Span::styled(" │", theme.axis),
                Span::styled(FILLED.to_string().repeat(filled), theme.bar),
                Span::styled(format!(" {}", format_count(*count)), theme.value),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_pie(frame: &mut Frame, area: Rect, block: Block, entries: &[LegendEntry], theme: &Theme) {
    let inner_width = block.inner(area).width as usize;
    let total: u64 = entries.iter().map(|e| e.count).sum();

    let mut lines = vec![
        ProportionStrip::new(entries, inner_width).to_line(),
        Line::from(""),
    ];
    lines.extend(Legend::new(entries, theme).to_lines());
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Total ", theme.label),
        Span::styled(format_count(total), theme.value),
    ]));

    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn render_list(frame: &mut Frame, area: Rect, block: Block, view: &AggregateView, theme: &Theme) {
    let lines = match view {
        AggregateView::GenreCounts(rows)
        | AggregateView::TopBooks(rows)
        | AggregateView::TopReaders(rows) => Leaderboard::new(rows, theme).to_lines(),
        other => series(other)
            .into_iter()
            .map(|(label, _)| Line::from(Span::styled(format!("•{label}"), theme.value)))
            .collect(),
    };
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

/// One bar per reader, one coloured segment per genre, shared legend below.
fn render_stacked(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    cells: &[ReaderGenreCount],
    colors: &GenreColors,
    theme: &Theme,
) {
    // Readers in first-occurrence order, each with its cells in order.
    let mut readers: Vec<(&str, Vec<&ReaderGenreCount>)> = Vec::new();
    for cell in cells {
        match readers.iter_mut().find(|(r, _)| *r == cell.reader) {
            Some((_, group)) => group.push(cell),
            None => readers.push((cell.reader.as_str(), vec![cell])),
        }
    }

    let inner_width = block.inner(area).width;
    let label_w = label_column(readers.iter().map(|(r, _)| r.width()), inner_width);
    let totals: Vec<u64> = readers
        .iter()
        .map(|(_, group)| group.iter().map(|c| c.count).sum())
        .collect();
    let max = totals.iter().copied().max().unwrap_or(0).max(1);
    let value_w = format_count(max).len();
    let bar_w = (inner_width as usize).saturating_sub(label_w + value_w + 3);

    let mut lines: Vec<Line> = Vec::with_capacity(readers.len() + 2);
    for ((reader, group), total) in readers.iter().zip(&totals) {
        let width = (*total as f64 / max as f64 * bar_w as f64).round() as usize;
        let counts: Vec<u64> = group.iter().map(|c| c.count).collect();

        let mut spans = vec![
            Span::styled(fit_label(reader, label_w), theme.label),
            Span::styled(" │", theme.axis),
        ];
        for (cell, w) in group.iter().zip(segment_widths(&counts, width)) {
            if w > 0 {
                spans.push(Span::styled(
                    FILLED.to_string().repeat(w),
                    Style::default().fg(colors.color(&cell.genre, theme)),
                ));
            }
        }
        spans.push(Span::styled(format!(" {}", format_count(*total)), theme.value));
        lines.push(Line::from(spans));
    }

    // Legend lists the genres that appear, in palette order.
    let mut legend: Vec<LegendEntry> = Vec::new();
    let mut push_genre = |genre: &str| {
        if !legend.iter().any(|e| e.label == genre) && cells.iter().any(|c| c.genre == genre) {
            legend.push(LegendEntry {
                label: genre.to_string(),
                count: 0,
                color: colors.color(genre, theme),
            });
        }
    };
    colors.genres().iter().for_each(|g| push_genre(g.as_str()));
    cells.iter().for_each(|c| push_genre(c.genre.as_str()));

    lines.push(Line::from(""));
    lines.push(Legend::new(&legend, theme).labels_only().to_inline());

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// Months since year zero, so calendar gaps keep their spacing on the x axis.
fn month_ordinal(point: &MonthlyCount) -> f64 {
    (point.month.year() as f64) * 12.0 + point.month.month0() as f64
}

fn render_line(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    points: &[MonthlyCount],
    theme: &Theme,
) {
    let points: Vec<(f64, f64, String)> = points
        .iter()
        .map(|p| (month_ordinal(p), p.count as f64, month_label(p.month)))
        .collect();
    render_line_points(frame, area, block, &points, theme);
}

/// Line with markers.  Axis labels show the first, middle and last points.
fn render_line_points(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    points: &[(f64, f64, String)],
    theme: &Theme,
) {
    let data: Vec<(f64, f64)> = points.iter().map(|(x, y, _)| (*x, *y)).collect();
    let (x_min, x_max) = match (points.first(), points.last()) {
        (Some(first), Some(last)) if last.0 > first.0 => (first.0, last.0),
        (Some(only), _) => (only.0 - 1.0, only.0 + 1.0),
        _ => (0.0, 1.0),
    };
    let y_max = data.iter().map(|(_, y)| *y).fold(0.0_f64, f64::max).max(1.0).ceil();

    let mut x_labels: Vec<String> = Vec::new();
    if let Some(first) = points.first() {
        x_labels.push(first.2.clone());
    }
    if points.len() > 2 {
        x_labels.push(points[points.len() / 2].2.clone());
    }
    if points.len() > 1 {
        if let Some(last) = points.last() {
            x_labels.push(last.2.clone());
        }
    }
    let y_labels = vec![
        "0".to_string(),
        format!("{}", (y_max / 2.0).round()),
        format!("{y_max}"),
    ];

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.line)
            .data(&data),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(theme.marker)
            .data(&data),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([x_min, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Books", theme.axis))
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
