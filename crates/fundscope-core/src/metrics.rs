//! Risk/return statistics over a daily closing-price series.
//!
//! Every function here is pure. Daily statistics are annualized with a
//! fixed [`TRADING_DAYS_PER_YEAR`] factor and the Sharpe ratio assumes a zero
//! risk-free rate.

use serde::Serialize;
use thiserror::Error;

use crate::PriceSeries;

/// Approximate number of trading sessions in a year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Failure to derive metrics from a series.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MetricsError {
    #[error("price series is empty")]
    EmptySeries,
}

/// Statistics derived from one price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub current_price: f64,
    pub high_52w: f64,
    pub low_52w: f64,
    /// Position of the current price inside `[low_52w, high_52w]`, in `[0, 1]`.
    pub strength_52w: f64,
    pub avg_annual_return: f64,
    pub annual_volatility: f64,
    pub sharpe_ratio: f64,
}

/// Simple returns `(p[i] - p[i-1]) / p[i-1]`; one element shorter than the input.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns `0.0` for fewer than two values instead of NaN.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let sum_sq = values.iter().map(|x| (x - avg) * (x - avg)).sum::<f64>();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

pub fn compute_metrics(series: &PriceSeries) -> Result<Metrics, MetricsError> {
    let closes = series.closes();
    let current_price = *closes.last().ok_or(MetricsError::EmptySeries)?;

    let high_52w = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low_52w = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let range = high_52w - low_52w;
    let strength_52w = if range == 0.0 {
        0.0
    } else {
        (current_price - low_52w) / range
    };

    let returns = daily_returns(&closes);
    let avg_annual_return = mean(&returns) * TRADING_DAYS_PER_YEAR;
    let annual_volatility = sample_std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt();
    let sharpe_ratio = if annual_volatility == 0.0 {
        0.0
    } else {
        avg_annual_return / annual_volatility
    };

    Ok(Metrics {
        current_price,
        high_52w,
        low_52w,
        strength_52w,
        avg_annual_return,
        annual_volatility,
        sharpe_ratio,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{PricePoint, Symbol, UtcDateTime};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = UtcDateTime::parse("2024-01-01T21:00:00Z").expect("timestamp");
        let points = closes
            .iter()
            .enumerate()
            .map(|(day, close)| {
                let ts = UtcDateTime::from_unix_timestamp(
                    start.into_inner().unix_timestamp() + day as i64 * 86_400,
                )
                .expect("timestamp");
                PricePoint::new(ts, *close).expect("valid close")
            })
            .collect();
        PriceSeries::new(Symbol::parse("TEST").expect("symbol"), points)
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = compute_metrics(&series(&[])).expect_err("must fail");
        assert_eq!(err, MetricsError::EmptySeries);
    }

    #[test]
    fn daily_returns_are_one_shorter_than_prices() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        assert_relative_eq!(sample_std_dev(&[1.0, 2.0, 3.0, 4.0]), 1.290_994_448_735_805_6, epsilon = 1e-12);
        assert_eq!(sample_std_dev(&[0.5]), 0.0);
        assert_eq!(sample_std_dev(&[]), 0.0);
    }

    #[test]
    fn five_day_series_matches_hand_computation() {
        let metrics = compute_metrics(&series(&[100.0, 102.0, 101.0, 105.0, 103.0])).expect("metrics");

        assert_eq!(metrics.current_price, 103.0);
        assert_eq!(metrics.high_52w, 105.0);
        assert_eq!(metrics.low_52w, 100.0);
        assert_eq!(metrics.strength_52w, 0.6);

        let returns = daily_returns(&[100.0, 102.0, 101.0, 105.0, 103.0]);
        let expected_return = mean(&returns) * 252.0;
        let expected_vol = sample_std_dev(&returns) * 252.0_f64.sqrt();
        assert_relative_eq!(metrics.avg_annual_return, expected_return, epsilon = 1e-12);
        assert_relative_eq!(metrics.annual_volatility, expected_vol, epsilon = 1e-12);
        assert_relative_eq!(metrics.sharpe_ratio, expected_return / expected_vol, epsilon = 1e-12);
    }

    #[test]
    fn flat_series_has_zero_volatility_sharpe_and_strength() {
        let metrics = compute_metrics(&series(&[50.0, 50.0, 50.0, 50.0])).expect("metrics");

        assert_eq!(metrics.annual_volatility, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.strength_52w, 0.0);
        assert_eq!(metrics.avg_annual_return, 0.0);
    }

    #[test]
    fn single_observation_is_degenerate_not_an_error() {
        let metrics = compute_metrics(&series(&[42.0])).expect("metrics");

        assert_eq!(metrics.current_price, 42.0);
        assert_eq!(metrics.avg_annual_return, 0.0);
        assert_eq!(metrics.annual_volatility, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.strength_52w, 0.0);
    }

    #[test]
    fn two_observations_yield_return_without_volatility() {
        let metrics = compute_metrics(&series(&[100.0, 101.0])).expect("metrics");

        assert_relative_eq!(metrics.avg_annual_return, 0.01 * 252.0, epsilon = 1e-9);
        assert_eq!(metrics.annual_volatility, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.strength_52w, 1.0);
    }

    #[test]
    fn strength_stays_within_unit_interval() {
        let shapes: [&[f64]; 4] = [
            &[10.0, 20.0, 15.0],
            &[30.0, 10.0, 20.0, 5.0],
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[7.5, 7.4, 9.9, 8.8, 9.9],
        ];

        for closes in shapes {
            let metrics = compute_metrics(&series(closes)).expect("metrics");
            assert!(
                (0.0..=1.0).contains(&metrics.strength_52w),
                "strength {} out of range for {closes:?}",
                metrics.strength_52w
            );
        }
    }
}
