/// Volwatch Monitor - Shared Library
///
/// This library provides the computation and orchestration behind the `volwatch` binary:
/// - format: compact K/M/B magnitude formatting
/// - aggregation: trade window summary statistics and fluctuation in basis points
/// - classifier: fluctuation to normal / warning / alert tiers
/// - pipeline: concurrent per-instrument fetch, aggregate and classify cycles
/// - sink: terminal and JSON record output
///
/// Trades are fetched through the `volwatch-data` crate.
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::types::{Instrument, RecordMetrics, ResultRecord};

pub use shared::aggregation::{AggregateError, Summary, aggregate};
pub use shared::classifier::{AlertThresholds, Severity};
pub use shared::config::{ConfigError, MonitorConfig, OutputMode, PipelineConfig};
pub use shared::format::{
    FormatError, FormatOptions, format_compact, format_compact_str, format_compact_with,
};
pub use shared::pipeline::InstrumentPipeline;
pub use shared::sink::{JsonSink, RecordSink, SinkError, TerminalSink};
