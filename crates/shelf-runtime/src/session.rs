//! Per-viewer dashboard state.
//!
//! A [`DashboardSession`] owns one viewer's filter selection and the views
//! computed for it.  Every selection change reruns the synchronous
//! filter → aggregate pass over the shared record set.

use std::sync::Arc;

use shelf_core::models::{Choice, FilterSelection};
use shelf_data::analysis::{analyze_dashboard, DashboardAnalysis};
use shelf_data::pipeline::{FilterOptions, RecordSet};

/// One of the two filter selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Month,
    Genre,
}

impl Selector {
    pub fn label(self) -> &'static str {
        match self {
            Selector::Month => "Month",
            Selector::Genre => "Genre",
        }
    }

    /// The other selector.
    pub fn toggle(self) -> Self {
        match self {
            Selector::Month => Selector::Genre,
            Selector::Genre => Selector::Month,
        }
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

pub struct DashboardSession {
    records: Arc<RecordSet>,
    options: FilterOptions,
    selection: FilterSelection,
    analysis: DashboardAnalysis,
}

impl DashboardSession {
    /// Start a session with `initial` as the selection.
    ///
    /// Values that are not among the options fall back to `All`.
    pub fn new(records: Arc<RecordSet>, initial: &FilterSelection) -> Self {
        let options = FilterOptions::from_records(&records);
        let selection = options.sanitize(initial);
        if &selection != initial {
            tracing::warn!(
                requested_month = %initial.month,
                requested_genre = %initial.genre,
                "initial selection not present in data; falling back to All"
            );
        }
        let analysis = analyze_dashboard(&records, &selection);
        Self {
            records,
            options,
            selection,
            analysis,
        }
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn analysis(&self) -> &DashboardAnalysis {
        &self.analysis
    }

    /// Options offered by `selector`, `All` first.
    pub fn options_for(&self, selector: Selector) -> &[Choice] {
        match selector {
            Selector::Month => &self.options.months,
            Selector::Genre => &self.options.genres,
        }
    }

    /// Current value of `selector`.
    pub fn choice(&self, selector: Selector) -> &Choice {
        match selector {
            Selector::Month => &self.selection.month,
            Selector::Genre => &self.selection.genre,
        }
    }

    /// Position of the current value in its option list.
    pub fn selected_index(&self, selector: Selector) -> usize {
        let current = self.choice(selector);
        self.options_for(selector)
            .iter()
            .position(|c| c == current)
            .unwrap_or(0)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Replace the selection; returns `true` when the views were recomputed.
    pub fn set_selection(&mut self, selection: &FilterSelection) -> bool {
        let selection = self.options.sanitize(selection);
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.recompute();
        true
    }

    /// Step `selector` forward or backward through its options, wrapping.
    pub fn cycle(&mut self, selector: Selector, forward: bool) {
        let options = self.options_for(selector);
        let len = options.len();
        if len <= 1 {
            return;
        }
        let index = self.selected_index(selector);
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        let choice = options[next].clone();

        let mut selection = self.selection.clone();
        match selector {
            Selector::Month => selection.month = choice,
            Selector::Genre => selection.genre = choice,
        }
        self.set_selection(&selection);
    }

    /// Set both selectors back to `All`.
    pub fn reset(&mut self) -> bool {
        self.set_selection(&FilterSelection::default())
    }

    fn recompute(&mut self) {
        tracing::debug!(
            month = %self.selection.month,
            genre = %self.selection.genre,
            "selection changed"
        );
        self.analysis = analyze_dashboard(&self.records, &self.selection);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
