pub mod analytics;
pub mod config;
pub mod filter;
pub mod fixtures;
pub mod insight;
pub mod logging;
pub mod types;
pub mod ui;
