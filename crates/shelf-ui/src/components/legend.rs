use crate::themes::Theme;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use shelf_core::formatting::{format_count, percentage};

/// Character used for filled strip and bar cells.
pub const FILLED: char = '█';
/// Swatch drawn before each legend label.
pub const SWATCH: &str = "■ ";

/// One coloured category.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub count: u64,
    pub color: Color,
}

/// Split `width` cells between `counts` proportionally.
///
/// Uses largest-remainder rounding so the widths always sum to `width`
/// (when any count is non-zero).  Ties go to the earlier entry.
pub fn segment_widths(counts: &[u64], width: usize) -> Vec<usize> {
    let total: u64 = counts.iter().sum();
    if total == 0 || width == 0 {
        return vec![0; counts.len()];
    }

    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * width as f64 / total as f64)
        .collect();
    let mut widths: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let assigned: usize = widths.iter().sum();
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &i in order.iter().take(width.saturating_sub(assigned)) {
        widths[i] += 1;
    }
    widths
}

// ── ProportionStrip ──────────────────────────────────────────────────────────

/// A single-row bar split into coloured segments, one per entry.
///
/// Stands in for a pie chart: each segment's width is its share of the
/// total.
pub struct ProportionStrip<'a> {
    pub entries: &'a [LegendEntry],
    pub width: usize,
}

impl<'a> ProportionStrip<'a> {
    pub fn new(entries: &'a [LegendEntry], width: usize) -> Self {
        Self { entries, width }
    }

    pub fn to_line(&self) -> Line<'a> {
        let counts: Vec<u64> = self.entries.iter().map(|e| e.count).collect();
        let spans: Vec<Span<'a>> = segment_widths(&counts, self.width)
            .into_iter()
            .zip(self.entries)
            .filter(|(w, _)| *w > 0)
            .map(|(w, entry)| {
                Span::styled(
                    FILLED.to_string().repeat(w),
                    Style::default().fg(entry.color),
                )
            })
            .collect();
        Line::from(spans)
    }
}

// ── Legend ───────────────────────────────────────────────────────────────────

/// `■ label  count (pct%)` per entry; percentages are of the entries' total.
pub struct Legend<'a> {
    pub entries: &'a [LegendEntry],
    pub show_counts: bool,
    pub theme: &'a Theme,
}

impl<'a> Legend<'a> {
    pub fn new(entries: &'a [LegendEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            show_counts: true,
            theme,
        }
    }

    /// Labels only, for legends shared by several bars.
    pub fn labels_only(mut self) -> Self {
        self.show_counts = false;
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let total: u64 = self.entries.iter().map(|e| e.count).sum();
        self.entries
            .iter()
            .map(|entry| {
                let mut spans = vec![
                    Span::styled(SWATCH, Style::default().fg(entry.color)),
                    Span::styled(entry.label.clone(), self.theme.text),
                ];
                if self.show_counts {
                    spans.push(Span::styled(
                        format!(
                            "  {} ({:.1}%)",
                            format_count(entry.count),
                            percentage(entry.count, total, 1)
                        ),
                        self.theme.dim,
                    ));
                }
                Line::from(spans)
            })
            .collect()
    }

    /// All entries on one line, for compact legends.
    pub fn to_inline(&self) -> Line<'a> {
        let mut spans = Vec::with_capacity(self.entries.len() * 3);
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(SWATCH, Style::default().fg(entry.color)));
            spans.push(Span::styled(entry.label.clone(), self.theme.text));
        }
        Line::from(spans)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
