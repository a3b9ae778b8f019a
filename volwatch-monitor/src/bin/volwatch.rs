use std::process::ExitCode;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};
use volwatch_data::exchange::binance_alpha::AlphaTradeFetcher;
use volwatch_monitor::{
    InstrumentPipeline, JsonSink, MonitorConfig, OutputMode, RecordSink, TerminalSink,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    init_logging();

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let fetcher = match AlphaTradeFetcher::new(config.fetcher.clone()) {
        Ok(fetcher) => fetcher,
        Err(error) => {
            error!(%error, "failed to initialise trade fetcher");
            return ExitCode::FAILURE;
        }
    };

    info!(
        url = %config.fetcher.url,
        instruments = config.instruments.len(),
        poll_interval_ms = config.poll_interval.as_millis(),
        window_ms = config.pipeline.window.as_millis(),
        "starting volwatch"
    );

    let pipeline = InstrumentPipeline::new(fetcher, config.pipeline);
    let mut sink: Box<dyn RecordSink> = match config.output {
        OutputMode::Terminal => Box::new(TerminalSink::new(std::io::stdout())),
        OutputMode::Json => Box::new(JsonSink::new(std::io::stdout())),
    };

    // A slow cycle delays the next tick rather than queueing a burst of cycles
    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut cycle = 0_u64;
    loop {
        let records = tokio::select! {
            records = async {
                ticker.tick().await;
                pipeline.run_cycle(&config.instruments).await
            } => records,
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        };

        cycle += 1;
        if let Err(error) = sink.publish(cycle, &records) {
            error!(%error, cycle, "failed to publish records");
        }
    }

    ExitCode::SUCCESS
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
