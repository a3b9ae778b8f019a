/// Per-instrument fetch, aggregate and classify orchestration.
///
/// Each polling cycle runs every instrument concurrently and produces exactly one
/// [`ResultRecord`] per instrument, in input order. A fault in one instrument only degrades
/// that instrument's record to a partial record.
use crate::shared::{
    aggregation::{AggregateError, aggregate},
    config::PipelineConfig,
    format::format_decimal,
    types::{Instrument, RecordMetrics, ResultRecord},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};
use volwatch_data::{DataError, TradeWindow, TradeWindowFetcher, timeout::with_fetch_timeout};

/// Reason an instrument produced a partial record. Never escapes a cycle.
#[derive(Debug, Error)]
enum PipelineFault {
    #[error(transparent)]
    Fetch(#[from] DataError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

#[derive(Debug, Clone)]
pub struct InstrumentPipeline<Fetcher> {
    fetcher: Fetcher,
    config: PipelineConfig,
}

impl<Fetcher> InstrumentPipeline<Fetcher>
where
    Fetcher: TradeWindowFetcher,
{
    pub fn new(fetcher: Fetcher, config: PipelineConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run one polling cycle over the trailing window ending now.
    pub async fn run_cycle(&self, instruments: &[Instrument]) -> Vec<ResultRecord> {
        self.run_cycle_at(instruments, Utc::now()).await
    }

    /// Run one polling cycle over the trailing window ending at `now`.
    ///
    /// The output has the same length and order as `instruments`.
    pub async fn run_cycle_at(
        &self,
        instruments: &[Instrument],
        now: DateTime<Utc>,
    ) -> Vec<ResultRecord> {
        let window = TradeWindow::trailing(now, self.config.window);
        info!(
            instruments = instruments.len(),
            start_ms = window.start_ms(),
            end_ms = window.end_ms(),
            "polling cycle started"
        );

        let records = join_all(
            instruments
                .iter()
                .map(|instrument| self.process_instrument(instrument, window)),
        )
        .await;

        let partial = records.iter().filter(|record| record.is_partial()).count();
        info!(records = records.len(), partial, "polling cycle finished");

        records
    }

    async fn process_instrument(
        &self,
        instrument: &Instrument,
        window: TradeWindow,
    ) -> ResultRecord {
        match self.evaluate(instrument, window).await {
            Ok(Some(metrics)) => ResultRecord::complete(instrument, metrics),
            Ok(None) => {
                info!(
                    symbol = %instrument.symbol,
                    instrument_id = %instrument.id,
                    "no trades in window"
                );
                ResultRecord::partial(instrument)
            }
            Err(fault) => {
                warn!(
                    symbol = %instrument.symbol,
                    instrument_id = %instrument.id,
                    %fault,
                    "instrument degraded to partial record"
                );
                ResultRecord::partial(instrument)
            }
        }
    }

    async fn evaluate(
        &self,
        instrument: &Instrument,
        window: TradeWindow,
    ) -> Result<Option<RecordMetrics>, PipelineFault> {
        let trades = with_fetch_timeout(
            &instrument.id,
            self.config.fetch_timeout,
            self.fetcher.fetch_window(&instrument.id, window),
        )
        .await?;

        let Some(summary) = aggregate(&trades)? else {
            return Ok(None);
        };

        let severity = self.config.thresholds.classify(summary.fluctuation_bps);
        debug!(
            symbol = %instrument.symbol,
            trades = summary.trade_count,
            fluctuation_bps = %summary.fluctuation_bps,
            %severity,
            "classified trade window"
        );

        Ok(Some(RecordMetrics {
            mul_point: instrument.mul_point.clone(),
            severity,
            fluctuation_bps: summary.fluctuation_bps,
            formatted_notional: format_decimal(
                summary.total_notional,
                self.config.notional_format,
            ),
            min_price: summary.min_price,
            last_price: summary.last_price,
            span_seconds: summary.span_seconds,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::classifier::Severity;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::{collections::HashMap, sync::Mutex, time::Duration};
    use volwatch_data::TradeEvent;

    #[derive(Debug, Clone)]
    enum FakeResponse {
        Trades(Vec<TradeEvent>),
        Delayed(Duration, Vec<TradeEvent>),
        Fail,
        Hang,
    }

    #[derive(Debug, Default)]
    struct FakeFetcher {
        responses: HashMap<String, FakeResponse>,
        requests: Mutex<Vec<(String, TradeWindow)>>,
    }

    impl FakeFetcher {
        fn with(mut self, instrument_id: &str, response: FakeResponse) -> Self {
            self.responses.insert(instrument_id.to_string(), response);
            self
        }
    }

    #[async_trait]
    impl TradeWindowFetcher for FakeFetcher {
        async fn fetch_window(
            &self,
            instrument_id: &str,
            window: TradeWindow,
        ) -> Result<Vec<TradeEvent>, DataError> {
            self.requests
                .lock()
                .unwrap()
                .push((instrument_id.to_string(), window));

            match self.responses.get(instrument_id) {
                Some(FakeResponse::Trades(trades)) => Ok(trades.clone()),
                Some(FakeResponse::Delayed(delay, trades)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(trades.clone())
                }
                Some(FakeResponse::Fail) => Err(DataError::fetch_failed(
                    instrument_id,
                    "upstream returned status 502 Bad Gateway",
                )),
                Some(FakeResponse::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(vec![])
                }
                None => Ok(vec![]),
            }
        }
    }

    fn trade(price: Decimal, quantity: Decimal, timestamp_ms: i64) -> TradeEvent {
        TradeEvent::from_millis(price, quantity, timestamp_ms).unwrap()
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_010_000).unwrap()
    }

    fn instruments() -> Vec<Instrument> {
        vec![
            Instrument::new("ALPHA_175", "KGEN").with_mul_point(4),
            Instrument::new("ALPHA_212", "TIMI").with_mul_point(1),
            Instrument::new("ALPHA_301", "IR").with_mul_point("x2"),
        ]
    }

    fn volatile_trades() -> Vec<TradeEvent> {
        vec![trade(dec!(100), dec!(1), 1000), trade(dec!(110), dec!(2), 9000)]
    }

    #[tokio::test]
    async fn test_run_cycle_at_builds_complete_record() {
        let fetcher =
            FakeFetcher::default().with("ALPHA_175", FakeResponse::Trades(volatile_trades()));
        let pipeline = InstrumentPipeline::new(fetcher, PipelineConfig::default());

        let records = pipeline.run_cycle_at(&instruments()[..1], now()).await;

        assert_eq!(
            records,
            vec![ResultRecord {
                instrument_id: "ALPHA_175".to_string(),
                symbol: "KGEN".to_string(),
                metrics: Some(RecordMetrics {
                    mul_point: Some(4.into()),
                    severity: Severity::Alert,
                    fluctuation_bps: dec!(1000.0000),
                    formatted_notional: "320".to_string(),
                    min_price: dec!(100),
                    last_price: dec!(110),
                    span_seconds: dec!(8),
                }),
            }]
        );
        assert_eq!(
            records[0].metrics.as_ref().unwrap().fluctuation_bps.to_string(),
            "1000.0000"
        );
    }

    #[tokio::test]
    async fn test_run_cycle_at_requests_trailing_window() {
        let pipeline = InstrumentPipeline::new(
            FakeFetcher::default(),
            PipelineConfig::default().with_window(Duration::from_secs(30)),
        );

        pipeline.run_cycle_at(&instruments(), now()).await;

        let mut requests = pipeline.fetcher.requests.lock().unwrap().clone();
        requests.sort_by(|a, b| a.0.cmp(&b.0));
        let expected_window = TradeWindow::trailing(now(), Duration::from_secs(30));
        assert_eq!(
            requests,
            vec![
                ("ALPHA_175".to_string(), expected_window),
                ("ALPHA_212".to_string(), expected_window),
                ("ALPHA_301".to_string(), expected_window),
            ]
        );
        assert_eq!(expected_window.start_ms(), 1_699_999_980_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycle_at_isolates_timed_out_instrument() {
        let fetcher = FakeFetcher::default()
            .with("ALPHA_175", FakeResponse::Trades(volatile_trades()))
            .with("ALPHA_212", FakeResponse::Hang)
            .with("ALPHA_301", FakeResponse::Trades(volatile_trades()));
        let pipeline = InstrumentPipeline::new(
            fetcher,
            PipelineConfig::default().with_fetch_timeout(Duration::from_secs(5)),
        );

        let records = pipeline.run_cycle_at(&instruments(), now()).await;

        let actual = records
            .iter()
            .map(|record| (record.instrument_id.as_str(), record.is_partial()))
            .collect::<Vec<_>>();
        assert_eq!(
            actual,
            vec![("ALPHA_175", false), ("ALPHA_212", true), ("ALPHA_301", false)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycle_at_fetches_instruments_concurrently() {
        // Completion order (TIMI, IR, KGEN) differs from input order
        let fetcher = FakeFetcher::default()
            .with(
                "ALPHA_175",
                FakeResponse::Delayed(Duration::from_secs(3), volatile_trades()),
            )
            .with(
                "ALPHA_212",
                FakeResponse::Delayed(
                    Duration::from_secs(1),
                    vec![trade(dec!(2.0000), dec!(1), 1000), trade(dec!(2.0001), dec!(1), 2000)],
                ),
            )
            .with(
                "ALPHA_301",
                FakeResponse::Delayed(
                    Duration::from_secs(2),
                    vec![trade(dec!(1.000), dec!(1), 1000), trade(dec!(1.0003), dec!(1), 2000)],
                ),
            );
        let pipeline = InstrumentPipeline::new(fetcher, PipelineConfig::default());

        let started = tokio::time::Instant::now();
        let records = pipeline.run_cycle_at(&instruments(), now()).await;
        let elapsed = started.elapsed();

        assert!(
            elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4),
            "cycle took {elapsed:?}, expected the slowest single fetch (3s) not their sum (6s)"
        );
        assert_eq!(
            records
                .iter()
                .map(|record| (record.symbol.as_str(), record.severity()))
                .collect::<Vec<_>>(),
            vec![
                ("KGEN", Some(Severity::Alert)),
                ("TIMI", Some(Severity::Normal)),
                ("IR", Some(Severity::Warning)),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_cycle_at_degrades_faults_to_partial_records() {
        struct TestCase {
            response: Option<FakeResponse>,
        }

        let tests = vec![
            TestCase {
                // TC0: zero trades in window
                response: Some(FakeResponse::Trades(vec![])),
            },
            TestCase {
                // TC1: fetch failure
                response: Some(FakeResponse::Fail),
            },
            TestCase {
                // TC2: non-positive price violates data integrity
                response: Some(FakeResponse::Trades(vec![
                    trade(dec!(0), dec!(1), 1000),
                    trade(dec!(1), dec!(1), 2000),
                ])),
            },
            TestCase {
                // TC3: fetcher has nothing for the instrument
                response: None,
            },
        ];

        let instrument = Instrument::new("ALPHA_212", "TIMI");
        for (index, test) in tests.into_iter().enumerate() {
            let mut fetcher = FakeFetcher::default();
            if let Some(response) = test.response {
                fetcher = fetcher.with("ALPHA_212", response);
            }
            let pipeline = InstrumentPipeline::new(fetcher, PipelineConfig::default());

            let actual = pipeline
                .run_cycle_at(std::slice::from_ref(&instrument), now())
                .await;

            assert_eq!(actual, vec![ResultRecord::partial(&instrument)], "TC{} failed", index);
        }
    }

    #[tokio::test]
    async fn test_run_cycle_at_preserves_order_and_is_repeatable() {
        let fetcher = FakeFetcher::default()
            .with(
                "ALPHA_175",
                FakeResponse::Trades(vec![
                    trade(dec!(2.0000), dec!(100), 1000),
                    trade(dec!(2.0001), dec!(50), 2000),
                ]),
            )
            .with("ALPHA_212", FakeResponse::Fail)
            .with(
                "ALPHA_301",
                FakeResponse::Trades(vec![
                    trade(dec!(1.000), dec!(5000), 1000),
                    trade(dec!(1.0003), dec!(5000), 4000),
                ]),
            );
        let pipeline = InstrumentPipeline::new(fetcher, PipelineConfig::default());

        let first = pipeline.run_cycle_at(&instruments(), now()).await;
        let second = pipeline.run_cycle_at(&instruments(), now()).await;

        assert_eq!(first, second);
        assert_eq!(
            first
                .iter()
                .map(|record| (record.symbol.as_str(), record.severity()))
                .collect::<Vec<_>>(),
            vec![
                ("KGEN", Some(Severity::Normal)),
                ("TIMI", None),
                ("IR", Some(Severity::Warning)),
            ]
        );
        assert_eq!(
            first[2].metrics.as_ref().unwrap().formatted_notional,
            "10K"
        );
    }

    #[tokio::test]
    async fn test_run_cycle_at_empty_instrument_list() {
        let pipeline = InstrumentPipeline::new(FakeFetcher::default(), PipelineConfig::default());
        assert!(pipeline.run_cycle_at(&[], now()).await.is_empty());
    }
}
