//! CLI argument definitions for fundscope.
//!
//! # Usage
//!
//! ```bash
//! # One-shot report
//! fundscope spy
//!
//! # Machine-readable output
//! fundscope QQQ --format json --pretty
//!
//! # Interactive prompt, one symbol per line
//! fundscope
//!
//! # Offline deterministic data
//! fundscope VTI --mock
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Parser, ValueEnum};
use fundscope_core::HistoryRange;

/// Fund analyzer: risk/return statistics and a BUY/HOLD/SELL verdict for a ticker.
#[derive(Debug, Parser)]
#[command(
    name = "fundscope",
    author,
    version,
    about = "Fund analyzer: one-year risk/return statistics and a rule-based verdict",
    long_about = "Enter any US ETF or stock symbol (e.g. SPY, QQQ, VTI, ARKK, INDA). fundscope \
fetches a year of daily closes and a fundamentals snapshot from Yahoo Finance, derives \
annualized return, volatility, Sharpe ratio and 52-week strength, and scores them into a \
BUY, HOLD or SELL verdict.\n\
\n\
Without a SYMBOL argument, symbols are read interactively from stdin, one per line."
)]
pub struct Cli {
    /// Ticker to analyze; omit to start the interactive prompt.
    pub symbol: Option<String>,

    /// Output format for reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// History window to analyze.
    #[arg(long, value_enum, default_value_t = RangeArg::OneYear)]
    pub range: RangeArg,

    /// Use deterministic offline data instead of Yahoo Finance.
    #[arg(long, env = "FUNDSCOPE_MOCK", default_value_t = false)]
    pub mock: bool,

    /// Per-request timeout budget in milliseconds.
    #[arg(long, env = "FUNDSCOPE_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// The full report as JSON.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeArg {
    #[value(name = "6mo")]
    SixMonths,
    #[value(name = "1y")]
    OneYear,
    #[value(name = "2y")]
    TwoYears,
}

impl From<RangeArg> for HistoryRange {
    fn from(value: RangeArg) -> Self {
        match value {
            RangeArg::SixMonths => Self::SixMonths,
            RangeArg::OneYear => Self::OneYear,
            RangeArg::TwoYears => Self::TwoYears,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_one_shot_invocation() {
        let cli = Cli::try_parse_from(["fundscope", "spy", "--format", "json", "--range", "6mo"])
            .expect("valid args");
        assert_eq!(cli.symbol.as_deref(), Some("spy"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(HistoryRange::from(cli.range), HistoryRange::SixMonths);
    }

    #[test]
    fn symbol_is_optional() {
        let cli = Cli::try_parse_from(["fundscope"]).expect("valid args");
        assert!(cli.symbol.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.range, RangeArg::OneYear);
    }
}
