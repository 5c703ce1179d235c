//! Behaviour-driven tests for the metrics engine and verdict rule
//!
//! Each scenario starts from a price series or a set of figures and checks
//! the score and verdict a user would see.

use approx::assert_relative_eq;
use fundscope_core::{
    compute_metrics, compute_verdict, score_breakdown, Fundamentals, Metrics, MetricsError,
    PricePoint, PriceSeries, Score, Symbol, UtcDateTime, Verdict,
};

fn series(closes: &[f64]) -> PriceSeries {
    let points = closes
        .iter()
        .enumerate()
        .map(|(day, close)| {
            let ts = UtcDateTime::from_unix_timestamp(1_704_229_200 + day as i64 * 86_400)
                .expect("valid timestamp");
            PricePoint::new(ts, *close).expect("positive close")
        })
        .collect();
    PriceSeries::new(Symbol::parse("ETF").expect("valid"), points)
}

fn metrics_with(sharpe_ratio: f64, strength_52w: f64) -> Metrics {
    Metrics {
        current_price: 100.0,
        high_52w: 120.0,
        low_52w: 80.0,
        strength_52w,
        avg_annual_return: 0.08,
        annual_volatility: 0.16,
        sharpe_ratio,
    }
}

fn fundamentals(pe_ratio: Option<f64>, dividend_yield_pct: Option<f64>) -> Fundamentals {
    Fundamentals::new(
        Symbol::parse("ETF").expect("valid"),
        pe_ratio,
        dividend_yield_pct.map(|pct| pct / 100.0),
    )
    .expect("valid fundamentals")
}

// =============================================================================
// Metrics scenarios
// =============================================================================

#[test]
fn when_strength_lands_exactly_on_threshold_no_point_is_awarded() {
    // Given: closes whose current price sits at 60% of the range
    let metrics = compute_metrics(&series(&[100.0, 102.0, 101.0, 105.0, 103.0])).expect("metrics");

    // Then: the extremes and strength match the hand computation
    assert_eq!(metrics.current_price, 103.0);
    assert_eq!(metrics.high_52w, 105.0);
    assert_eq!(metrics.low_52w, 100.0);
    assert_relative_eq!(metrics.strength_52w, 0.6);

    // And: the strict comparison withholds the strength point
    let breakdown = score_breakdown(&metrics, &fundamentals(None, None));
    assert_eq!(breakdown.strength, 0);
}

#[test]
fn when_series_is_empty_metrics_fail_with_empty_series() {
    let error = compute_metrics(&series(&[])).expect_err("empty series must fail");
    assert_eq!(error, MetricsError::EmptySeries);
}

#[test]
fn when_all_prices_are_identical_only_fundamentals_can_score() {
    // Given: a perfectly flat series
    let metrics = compute_metrics(&series(&[50.0, 50.0, 50.0, 50.0])).expect("metrics");

    // Then: every price-derived statistic is zero rather than NaN
    assert_eq!(metrics.annual_volatility, 0.0);
    assert_eq!(metrics.sharpe_ratio, 0.0);
    assert_eq!(metrics.strength_52w, 0.0);
    assert_eq!(metrics.avg_annual_return, 0.0);

    // And: the score is driven purely by the fundamentals
    let (score, verdict) = compute_verdict(&metrics, &fundamentals(Some(18.0), Some(3.0)));
    assert_eq!(score.value(), 2);
    assert_eq!(verdict, Verdict::Hold);

    let (score, verdict) = compute_verdict(&metrics, &fundamentals(None, None));
    assert_eq!(score.value(), 0);
    assert_eq!(verdict, Verdict::Sell);
}

#[test]
fn steadily_rising_series_scores_a_strong_sharpe() {
    let closes = (0..252)
        .map(|day| 100.0 * (1.0 + 0.001 * f64::from(day)) + if day % 2 == 0 { 0.05 } else { -0.05 })
        .collect::<Vec<_>>();
    let metrics = compute_metrics(&series(&closes)).expect("metrics");

    assert!(metrics.sharpe_ratio > 1.0, "sharpe was {}", metrics.sharpe_ratio);
    assert!(metrics.strength_52w > 0.9);
    assert_eq!(score_breakdown(&metrics, &fundamentals(None, None)).sharpe, 2);
}

// =============================================================================
// Verdict scenarios
// =============================================================================

#[test]
fn when_every_criterion_hits_the_verdict_is_buy_with_full_score() {
    let (score, verdict) =
        compute_verdict(&metrics_with(1.2, 0.7), &fundamentals(Some(20.0), Some(2.0)));

    assert_eq!(score, Score::new(5));
    assert_eq!(verdict, Verdict::Buy);
}

#[test]
fn when_nothing_hits_and_fundamentals_are_missing_the_verdict_is_sell() {
    let (score, verdict) = compute_verdict(&metrics_with(0.3, 0.2), &fundamentals(None, None));

    assert_eq!(score.value(), 0);
    assert_eq!(verdict, Verdict::Sell);
}

#[test]
fn boundary_values_never_earn_points() {
    let breakdown = score_breakdown(&metrics_with(0.5, 0.6), &fundamentals(Some(25.0), Some(1.5)));

    assert_eq!(breakdown.sharpe, 0);
    assert_eq!(breakdown.dividend, 0);
    assert_eq!(breakdown.valuation, 0);
    assert_eq!(breakdown.strength, 0);
}

#[test]
fn score_never_decreases_when_a_single_criterion_improves() {
    let sharpe_steps = [-1.0, 0.0, 0.5, 0.51, 1.0, 1.01, 3.0];
    let strength_steps = [0.0, 0.6, 0.61, 1.0];
    let pe_steps = [None, Some(40.0), Some(25.0), Some(24.9), Some(8.0)];
    let yield_steps = [None, Some(0.0), Some(1.5), Some(1.51), Some(6.0)];

    let score_of = |sharpe: f64, strength: f64, pe: Option<f64>, dividend: Option<f64>| {
        compute_verdict(&metrics_with(sharpe, strength), &fundamentals(pe, dividend)).0
    };

    for &strength in &strength_steps {
        for &pe in &pe_steps {
            for &dividend in &yield_steps {
                let scores = sharpe_steps
                    .iter()
                    .map(|&sharpe| score_of(sharpe, strength, pe, dividend))
                    .collect::<Vec<_>>();
                assert!(scores.windows(2).all(|w| w[0] <= w[1]), "sharpe: {scores:?}");
            }
        }
    }

    for &sharpe in &sharpe_steps {
        for &pe in &pe_steps {
            let scores = yield_steps
                .iter()
                .map(|&dividend| score_of(sharpe, 0.0, pe, dividend))
                .collect::<Vec<_>>();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]), "yield: {scores:?}");

            let scores = strength_steps
                .iter()
                .map(|&strength| score_of(sharpe, strength, pe, None))
                .collect::<Vec<_>>();
            assert!(scores.windows(2).all(|w| w[0] <= w[1]), "strength: {scores:?}");
        }
    }
}

#[test]
fn verdict_partition_covers_every_score_once() {
    for points in 0..=5_u8 {
        let verdict = Verdict::from_score(Score::new(points));
        let expected = match points {
            0 | 1 => Verdict::Sell,
            2 | 3 => Verdict::Hold,
            _ => Verdict::Buy,
        };
        assert_eq!(verdict, expected, "score {points}");
    }
}

#[test]
fn missing_yield_and_zero_yield_score_the_same() {
    let metrics = metrics_with(0.7, 0.7);
    let missing = compute_verdict(&metrics, &fundamentals(Some(30.0), None));
    let zero = compute_verdict(&metrics, &fundamentals(Some(30.0), Some(0.0)));
    assert_eq!(missing, zero);
}
