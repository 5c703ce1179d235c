//! # Fundscope Core
//!
//! Quick due-diligence report for a fund or equity ticker: one year of daily
//! closes and a fundamentals snapshot go in, a handful of risk/return
//! statistics and a BUY/HOLD/SELL verdict come out.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo Finance, live or offline) |
//! | [`data_source`] | Provider trait, history request and source errors |
//! | [`domain`] | Symbol, price series and fundamentals types |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`metrics`] | Annualized return, volatility, Sharpe ratio, 52-week strength |
//! | [`report`] | Per-query request handler |
//! | [`source`] | Provider identifiers |
//! | [`verdict`] | Point-scoring rubric and verdict mapping |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fundscope_core::{analyze_input, HistoryRange, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = YahooAdapter::live()?;
//!     let report = analyze_input(&adapter, "vti", HistoryRange::OneYear).await?;
//!     println!("{}: {} ({})", report.symbol, report.verdict, report.score);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / prompt   │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌────────────────────┐
//! │ report::analyze │────▶│ MarketDataProvider │
//! └────────┬────────┘     │ (YahooAdapter)     │
//!          │              └────────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ metrics         │────▶│ verdict          │
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod report;
pub mod source;
pub mod verdict;

pub use adapters::{YahooAdapter, YahooAuthManager};

pub use data_source::{
    HistoryRange, HistoryRequest, MarketDataProvider, SourceError, SourceErrorKind,
};

pub use domain::{Fundamentals, PricePoint, PriceSeries, Symbol, UtcDateTime};

pub use error::ValidationError;

pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use metrics::{compute_metrics, Metrics, MetricsError, TRADING_DAYS_PER_YEAR};

pub use report::{analyze, analyze_input, FundReport, ReportError, NO_DATA_MESSAGE};

pub use source::ProviderId;

pub use verdict::{compute_verdict, score_breakdown, Score, ScoreBreakdown, Verdict};
