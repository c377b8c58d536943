//! Data layer for Shelf.
//!
//! Fetches raw rows from a record source, maps their headers onto the
//! semantic fields, normalizes them into a date-ordered record set and runs
//! the filter and aggregation pipeline that feeds the dashboard.

pub mod aggregator;
pub mod analysis;
pub mod pipeline;
pub mod reader;
pub mod schema;

pub use shelf_core as core;
