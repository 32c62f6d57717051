//! Data ingestion layer for the solar dashboard.
//!
//! Reads the production and weather CSV files, resamples them to monthly
//! series, applies the retention window and joins the series into the table
//! the dashboard is built from.

pub mod filter;
pub mod joiner;
pub mod pipeline;
pub mod reader;
pub mod resampler;

pub use dashboard_core as core;
