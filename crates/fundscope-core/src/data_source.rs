//! Market data provider contract and request/error types.
//!
//! A provider supplies two things for a symbol: a daily closing-price
//! history and a fundamentals snapshot. Adapters implement
//! [`MarketDataProvider`]; the request handler in [`crate::report`] only
//! depends on this trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use fundscope_core::{HistoryRequest, MarketDataProvider, Symbol, YahooAdapter};
//!
//! async fn closes(adapter: &YahooAdapter) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
//!     let request = HistoryRequest::one_year(Symbol::parse("SPY")?);
//!     let series = adapter.history(request).await?;
//!     Ok(series.closes())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Fundamentals, PriceSeries, ProviderId, Symbol, ValidationError};

/// Lookback window requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl HistoryRange {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
        }
    }

    /// Nominal number of trading sessions in the window.
    pub const fn trading_days(self) -> usize {
        match self {
            Self::SixMonths => 126,
            Self::OneYear => 252,
            Self::TwoYears => 504,
        }
    }
}

impl Display for HistoryRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            other => Err(ValidationError::InvalidRange {
                value: other.to_owned(),
            }),
        }
    }
}

/// Request payload for the daily history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub range: HistoryRange,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, range: HistoryRange) -> Self {
        Self { symbol, range }
    }

    pub fn one_year(symbol: Symbol) -> Self {
        Self::new(symbol, HistoryRange::OneYear)
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    Internal,
}

/// Any failure reported by a market data provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::internal(error.to_string())
    }
}

/// Provider contract consumed by the report handler.
pub trait MarketDataProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Daily closes for the requested window. An unknown symbol may yield an
    /// empty series rather than an error.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;

    fn fundamentals<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Fundamentals, SourceError>> + Send + 'a>>;
}
