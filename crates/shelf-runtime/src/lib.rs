//! Runtime layer for Shelf.
//!
//! Loads the record set once per run and hands each viewer a
//! [`session::DashboardSession`] that owns its own filter state.

pub mod data_manager;
pub mod session;

pub use shelf_core as core;
pub use shelf_data as data;
