//! Shared foundation for the solar dashboard.
//!
//! Holds the monthly data model, the error type, command-line / file
//! configuration, timestamp parsing and number formatting used by the data,
//! runtime and UI crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
