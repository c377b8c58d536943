//! Domain layer for Shelf.
//!
//! Holds the reading-record and filter models, the aggregate view types the
//! pipeline produces, the shared error type, CLI settings and the date and
//! number formatting helpers used by every other crate.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, ShelfError};
