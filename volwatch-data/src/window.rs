use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Default trailing window requested per instrument (10 seconds).
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Closed time range `[start, end]` of trades requested from a trade source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TradeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TradeWindow {
    /// Construct the window `[now - length, now]`.
    ///
    /// Lengths reaching past the earliest representable time are clamped to it.
    pub fn trailing(now: DateTime<Utc>, length: Duration) -> Self {
        let length = TimeDelta::from_std(length).unwrap_or(TimeDelta::MAX);
        let start = now
            .checked_sub_signed(length)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        Self { start, end: now }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Window start as milliseconds since the Unix epoch.
    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    /// Window end as milliseconds since the Unix epoch.
    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}
