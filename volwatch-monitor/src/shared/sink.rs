/// Output port receiving each polling cycle's records.
use crate::shared::{classifier::Severity, types::ResultRecord};
use rust_decimal::RoundingStrategy;
use serde_json::Value;
use std::io::Write;
use thiserror::Error;

/// Red background `!!` prefix for [`Severity::Alert`] lines.
pub const ALERT_MARKER: &str = "\x1b[41m!!\x1b[0m";
/// Black on yellow `!` prefix for [`Severity::Warning`] lines.
pub const WARNING_MARKER: &str = "\x1b[30;43m!\x1b[0m";
/// Attribute reset prefix for normal and partial lines.
pub const NORMAL_MARKER: &str = "\x1b[0m";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write records: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialise records: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Consumer of completed polling cycles.
pub trait RecordSink {
    fn publish(&mut self, cycle: u64, records: &[ResultRecord]) -> Result<(), SinkError>;
}

pub fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Normal => NORMAL_MARKER,
        Severity::Warning => WARNING_MARKER,
        Severity::Alert => ALERT_MARKER,
    }
}

/// Writes one tab separated line per record, prefixed by its severity marker.
///
/// Complete: `<marker><symbol>\t<bps>\t<notional>\t<min price>\t<last price>\t<span>s[\tx<mulPoint>]`
/// Partial: `<marker><symbol>\tno data`
///
/// The `mulPoint` column is omitted when the instrument carries none.
#[derive(Debug)]
pub struct TerminalSink<W> {
    writer: W,
}

impl<W> TerminalSink<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &ResultRecord) -> std::io::Result<()> {
        let Some(metrics) = &record.metrics else {
            return writeln!(self.writer, "{NORMAL_MARKER}{}\tno data", record.symbol);
        };

        let span = metrics
            .span_seconds
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        writeln!(
            self.writer,
            "{}{}\t{}\t{}\t{}\t{}\t{}s{}",
            severity_marker(metrics.severity),
            record.symbol,
            metrics.fluctuation_bps,
            metrics.formatted_notional,
            metrics.min_price,
            metrics.last_price,
            span,
            mul_point_column(metrics.mul_point.as_ref()),
        )
    }
}

fn mul_point_column(mul_point: Option<&Value>) -> String {
    match mul_point {
        Some(Value::String(text)) => format!("\tx{text}"),
        Some(value) => format!("\tx{value}"),
        None => String::new(),
    }
}

impl<W> RecordSink for TerminalSink<W>
where
    W: Write,
{
    fn publish(&mut self, cycle: u64, records: &[ResultRecord]) -> Result<(), SinkError> {
        writeln!(self.writer, "--- cycle {cycle} ---")?;
        for record in records {
            self.write_record(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes each cycle as a single JSON array line.
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
}

impl<W> JsonSink<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> RecordSink for JsonSink<W>
where
    W: Write,
{
    fn publish(&mut self, _cycle: u64, records: &[ResultRecord]) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, records)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
