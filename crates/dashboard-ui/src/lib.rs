//! Terminal UI layer for the solar dashboard.
//!
//! Provides themes, the header and year-selector components, chart
//! rendering and the main application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod themes;

pub use dashboard_core as core;
