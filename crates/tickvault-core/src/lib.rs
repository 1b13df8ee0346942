//! # Tickvault Core
//!
//! Cached retrieval of daily price history.
//!
//! ## Overview
//!
//! A caller asks for a symbol's daily OHLCV history, optionally restricted to a
//! date window. Stored history is served while it is younger than the freshness
//! TTL (24 hours by default); otherwise the full history is fetched from Alpha
//! Vantage, normalized, stored, and then served.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Explicit startup configuration |
//! | [`domain`] | Symbols, dates, price records, cache entries |
//! | [`error`] | Validation errors and the structured [`RetrievalError`] |
//! | [`fetcher`] | Alpha Vantage daily-series fetcher |
//! | [`freshness`] | TTL freshness policy |
//! | [`http_client`] | Transport seam (reqwest in production) |
//! | [`orchestrator`] | The `serve` / `list` operations |
//! | [`range`] | Inclusive date-window filter |
//! | [`store`] | Record store contract with file and memory backends |
//! | [`transform`] | Provider payload normalization |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tickvault_core::{RetrievalConfig, RetrievalOrchestrator, ServeRequest, TradingDate};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetrievalConfig::from_env()?;
//! let orchestrator = RetrievalOrchestrator::from_config(&config)?;
//!
//! let request = ServeRequest::new("voo").with_range(
//!     Some(TradingDate::parse("2024-01-02")?),
//!     Some(TradingDate::parse("2024-01-31")?),
//! );
//! let response = orchestrator.serve(request).await?;
//! println!("{} of {} records", response.filtered_records, response.total_records);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure reaches the caller as a [`RetrievalError`] carrying an
//! [`ErrorKind`]; nothing is retried automatically. A rate-limited or failed
//! fetch leaves the previously stored entry untouched, and the caller may retry
//! explicitly with `force_refresh`.

pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod freshness;
pub mod http_client;
pub mod orchestrator;
pub mod range;
pub mod store;
pub mod transform;

pub use config::RetrievalConfig;
pub use domain::{CacheEntry, EntryMetadata, PriceRecord, Symbol, TradingDate, UtcDateTime};
pub use error::{ErrorKind, RetrievalError, ValidationError};
pub use fetcher::{AlphaVantageFetcher, FetchError};
pub use freshness::{is_fresh, FreshnessPolicy};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use orchestrator::{RetrievalOrchestrator, ServeRequest, ServeResponse};
pub use range::filter;
pub use store::{FileRecordStore, MemoryRecordStore, RecordStore, StoreError};
pub use transform::{transform, RawDailyBar, RawSeries, TransformError};
