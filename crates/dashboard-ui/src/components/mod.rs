pub mod header;
pub mod year_selector;
