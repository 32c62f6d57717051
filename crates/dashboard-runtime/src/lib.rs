//! Runtime layer for the solar dashboard.
//!
//! Turns the loaded data into charts: pure chart projection, the view
//! controller with its three year selectors, and the background loader.

pub mod charts;
pub mod controller;
pub mod loader;

pub use dashboard_core as core;
pub use dashboard_data as data;
