/// Shared modules for the volwatch monitor
pub mod aggregation;
pub mod classifier;
pub mod config;
pub mod format;
pub mod pipeline;
pub mod sink;
pub mod types;
