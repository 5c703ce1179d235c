//! Stateless request handler: one symbol in, one [`FundReport`] out.
//!
//! Nothing is cached between calls; concurrent calls share only the
//! provider.

use serde::Serialize;
use thiserror::Error;

use crate::data_source::{HistoryRange, HistoryRequest, MarketDataProvider, SourceError};
use crate::metrics::{compute_metrics, Metrics, MetricsError};
use crate::verdict::{score_breakdown, Score, ScoreBreakdown, Verdict};
use crate::{Fundamentals, ProviderId, Symbol, UtcDateTime, ValidationError};

/// Message shown when the provider has no history for a symbol.
pub const NO_DATA_MESSAGE: &str = "No data found. Check the symbol and try again.";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No data found. Check the symbol and try again.")]
    NoData { symbol: Symbol },

    #[error(transparent)]
    Provider(#[from] SourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Everything rendered for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundReport {
    pub symbol: Symbol,
    pub source: ProviderId,
    pub range: HistoryRange,
    pub generated_at: UtcDateTime,
    pub observations: usize,
    pub first_date: UtcDateTime,
    pub last_date: UtcDateTime,
    pub metrics: Metrics,
    pub fundamentals: Fundamentals,
    pub breakdown: ScoreBreakdown,
    pub score: Score,
    pub verdict: Verdict,
}

/// Parse raw user input and analyze it.
pub async fn analyze_input<P>(
    provider: &P,
    raw_symbol: &str,
    range: HistoryRange,
) -> Result<FundReport, ReportError>
where
    P: MarketDataProvider + ?Sized,
{
    let symbol = Symbol::parse(raw_symbol)?;
    analyze(provider, &symbol, range).await
}

pub async fn analyze<P>(
    provider: &P,
    symbol: &Symbol,
    range: HistoryRange,
) -> Result<FundReport, ReportError>
where
    P: MarketDataProvider + ?Sized,
{
    let series = provider
        .history(HistoryRequest::new(symbol.clone(), range))
        .await?;

    let metrics = compute_metrics(&series).map_err(|error| match error {
        MetricsError::EmptySeries => {
            tracing::info!(%symbol, "no price history");
            ReportError::NoData {
                symbol: symbol.clone(),
            }
        }
    })?;
    let (first, last) = series
        .first()
        .zip(series.last())
        .map(|(first, last)| (first.ts, last.ts))
        .ok_or_else(|| ReportError::NoData {
            symbol: symbol.clone(),
        })?;

    let fundamentals = provider.fundamentals(symbol).await?;
    let breakdown = score_breakdown(&metrics, &fundamentals);
    let score = breakdown.total();
    let verdict = Verdict::from_score(score);

    tracing::info!(
        %symbol,
        observations = series.len(),
        sharpe = metrics.sharpe_ratio,
        score = score.value(),
        %verdict,
        "report ready"
    );

    Ok(FundReport {
        symbol: symbol.clone(),
        source: provider.id(),
        range,
        generated_at: UtcDateTime::now(),
        observations: series.len(),
        first_date: first,
        last_date: last,
        metrics,
        fundamentals,
        breakdown,
        score,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::YahooAdapter;

    #[tokio::test]
    async fn mock_report_is_internally_consistent() {
        let adapter = YahooAdapter::mock();
        let report = analyze_input(&adapter, " qqq ", HistoryRange::OneYear)
            .await
            .expect("report");

        assert_eq!(report.symbol.as_str(), "QQQ");
        assert_eq!(report.observations, 252);
        assert!(report.first_date < report.last_date);
        assert_eq!(report.score, report.breakdown.total());
        assert_eq!(report.verdict, Verdict::from_score(report.score));
    }

    #[tokio::test]
    async fn blank_input_is_a_validation_error() {
        let adapter = YahooAdapter::mock();
        let error = analyze_input(&adapter, "  ", HistoryRange::OneYear)
            .await
            .expect_err("must fail");
        assert!(matches!(error, ReportError::Validation(ValidationError::EmptySymbol)));
    }

    #[test]
    fn no_data_message_matches_display() {
        let error = ReportError::NoData {
            symbol: Symbol::parse("NOPE").expect("symbol"),
        };
        assert_eq!(error.to_string(), NO_DATA_MESSAGE);
    }
}
