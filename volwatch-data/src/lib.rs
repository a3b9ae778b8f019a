#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Volwatch-Data
//! Trailing-window trade retrieval for the volwatch volatility monitor.
//!
//! Each call to a [`TradeWindowFetcher`] requests every trade executed for one instrument
//! inside a [`TradeWindow`] (by default the trailing 10 seconds) and returns them as
//! chronologically ordered [`TradeEvent`]s.
//!
//! * **Bounded**: every fetch carries a request timeout, see [`timeout`].
//! * **Normalised**: upstream payloads are decoded into exact [`rust_decimal::Decimal`]
//!   prices and quantities.
//! * **Explicit**: transport and payload faults surface as a [`DataError`], while an
//!   upstream reporting zero trades yields an empty `Vec`.
//!
//! ## Example
//! ```rust,ignore
//! use volwatch_data::{
//!     exchange::{TradeWindowFetcher, binance_alpha::{AlphaTradeFetcher, AlphaTradeFetcherConfig}},
//!     window::{DEFAULT_WINDOW, TradeWindow},
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let fetcher = AlphaTradeFetcher::new(AlphaTradeFetcherConfig::default()).unwrap();
//!     let window = TradeWindow::trailing(chrono::Utc::now(), DEFAULT_WINDOW);
//!
//!     let trades = fetcher.fetch_window("ALPHA_175", window).await.unwrap();
//!     println!("{} trades in window", trades.len());
//! }
//! ```

/// All [`Error`](std::error::Error)s generated in Volwatch-Data.
pub mod error;

/// Remote trade sources and the [`TradeWindowFetcher`](exchange::TradeWindowFetcher)
/// contract they implement.
pub mod exchange;

/// Per-fetch timeout enforcement.
pub mod timeout;

/// Normalised [`TradeEvent`](trade::TradeEvent) and its wire representation.
pub mod trade;

/// [`TradeWindow`](window::TradeWindow) time range requested from a trade source.
pub mod window;

pub use error::DataError;
pub use exchange::TradeWindowFetcher;
pub use trade::TradeEvent;
pub use window::TradeWindow;

