use std::fmt::{self, Write};

use shelf_core::formatting::{format_count, percentage, pluralize};
use shelf_core::models::{AggregateView, ViewKind};
use shelf_core::time_utils::month_label;
use shelf_data::analysis::DashboardAnalysis;

/// Views in the order the dashboard lays them out.
const ORDER: [ViewKind; 5] = [
    ViewKind::TopReaders,
    ViewKind::GenreCounts,
    ViewKind::MonthlyCounts,
    ViewKind::TopBooks,
    ViewKind::ReaderGenreMatrix,
];

pub const NO_DATA: &str = "no data for selected filters";

/// Plain-text rendering of every view, for `--view summary`.
pub fn render_summary(analysis: &DashboardAnalysis, source: &str) -> String {
    let mut out = String::new();
    // Formatting into a String cannot fail.
    write_summary(&mut out, analysis, source).ok();
    out
}

fn write_summary(out: &mut impl Write, analysis: &DashboardAnalysis, source: &str) -> fmt::Result {
    let meta = &analysis.metadata;
    writeln!(
        out,
        "Reading analytics: {} ({})",
        source,
        pluralize(meta.records_processed as u64, "record", "records")
    )?;
    writeln!(
        out,
        "Month: {}  Genre: {}  ({} matched)",
        meta.month,
        meta.genre,
        format_count(meta.records_matched as u64)
    )?;

    for kind in ORDER {
        writeln!(out)?;
        writeln!(out, "{}", kind.title())?;
        match analysis.view(kind) {
            None => writeln!(out, "  {NO_DATA}")?,
            Some(view) => write_view(out, view)?,
        }
    }
    Ok(())
}

fn write_view(out: &mut impl Write, view: &AggregateView) -> fmt::Result {
    match view {
        AggregateView::TopReaders(rows) => {
            for row in rows {
                writeln!(out, "  •{}  {}", row.label, pluralize(row.count, "book", "books"))?;
            }
        }
        AggregateView::GenreCounts(rows) => {
            let total = view.total();
            for row in rows {
                writeln!(
                    out,
                    "  {}  {} ({:.1}%)",
                    row.label,
                    format_count(row.count),
                    percentage(row.count, total, 1)
                )?;
            }
        }
        AggregateView::TopBooks(rows) => {
            for (rank, row) in rows.iter().enumerate() {
                writeln!(out, "  {}. {}  {}", rank + 1, row.label, format_count(row.count))?;
            }
        }
        AggregateView::MonthlyCounts(points) => {
            for point in points {
                writeln!(out, "  {}  {}", month_label(point.month), format_count(point.count))?;
            }
        }
        AggregateView::ReaderGenreMatrix(cells) => {
            for cell in cells {
                writeln!(
                    out,
                    "  {} / {}  {}",
                    cell.reader,
                    cell.genre,
                    format_count(cell.count)
                )?;
            }
        }
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
