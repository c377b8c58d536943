//! Terminal UI layer for the reading-log dashboard.
//!
//! Provides themes, header and selector components, chart renderers for
//! each aggregate view, the dashboard layout, and the main application event
//! loop built on top of [`ratatui`].

pub mod app;
pub mod charts;
pub mod components;
pub mod dashboard;
pub mod themes;

pub use shelf_core as core;
