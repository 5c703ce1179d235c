use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// One daily closing observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: UtcDateTime,
    pub close: f64,
}

impl PricePoint {
    pub fn new(ts: UtcDateTime, close: f64) -> Result<Self, ValidationError> {
        if !close.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "close" });
        }
        if close <= 0.0 {
            return Err(ValidationError::NonPositivePrice { value: close });
        }

        Ok(Self { ts, close })
    }
}

/// Chronologically ascending closing prices for a symbol.
///
/// An empty series is valid and means the provider had no history for the
/// symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|point| point.ts);
        Self { symbol, points }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: Vec::new(),
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Valuation snapshot used by the verdict rule.
///
/// `None` means the provider did not report the figure; it is never
/// conflated with a numeric zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: Symbol,
    pub pe_ratio: Option<f64>,
    /// Provider-native fraction, e.g. `0.025` for 2.5%.
    pub dividend_yield: Option<f64>,
}

impl Fundamentals {
    pub fn new(
        symbol: Symbol,
        pe_ratio: Option<f64>,
        dividend_yield: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_finite("pe_ratio", pe_ratio)?;
        validate_optional_finite("dividend_yield", dividend_yield)?;

        Ok(Self {
            symbol,
            pe_ratio,
            dividend_yield,
        })
    }

    pub fn unavailable(symbol: Symbol) -> Self {
        Self {
            symbol,
            pe_ratio: None,
            dividend_yield: None,
        }
    }

    /// Dividend yield expressed as a percentage (2.5 for 2.5%).
    pub fn dividend_yield_pct(&self) -> Option<f64> {
        self.dividend_yield.map(|fraction| fraction * 100.0)
    }
}

fn validate_optional_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
    }
    Ok(())
}
