use fundscope_core::{FundReport, ReportError};

use crate::cli::OutputFormat;
use crate::error::CliError;

const NOT_AVAILABLE: &str = "N/A";

pub fn render(report: &FundReport, format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
    }
}

/// User-facing message for a failed query.
pub fn render_error(error: &ReportError) -> String {
    match error {
        ReportError::NoData { .. } => error.to_string(),
        other => format!("Error: {other}"),
    }
}

fn render_text(report: &FundReport) -> String {
    let metrics = &report.metrics;
    let fundamentals = &report.fundamentals;
    let pe_ratio = fundamentals
        .pe_ratio
        .map_or_else(|| NOT_AVAILABLE.to_owned(), raw_number);
    let dividend_yield = fundamentals
        .dividend_yield_pct()
        .map_or_else(|| NOT_AVAILABLE.to_owned(), raw_number);

    [
        format!("Results for {}", report.symbol),
        format!(
            "Window: {} .. {} ({} sessions, {})",
            report.first_date.date_string(),
            report.last_date.date_string(),
            report.observations,
            report.range
        ),
        format!("Current Price: ${:.2}", metrics.current_price),
        format!("Average Annual Return: {}", percent(metrics.avg_annual_return, 2)),
        format!("Volatility: {}", percent(metrics.annual_volatility, 2)),
        format!("Sharpe Ratio: {:.2}", metrics.sharpe_ratio),
        format!("52W Strength: {}", percent(metrics.strength_52w, 1)),
        format!("P/E Ratio: {pe_ratio}"),
        format!("Dividend Yield: {dividend_yield}%"),
        format!("Score: {}", report.score),
        format!("Final Verdict: {}", report.verdict),
    ]
    .join("\n")
}

fn percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Provider value as-is, minus binary floating-point noise such as
/// `1.2500000000000002`.
fn raw_number(value: f64) -> String {
    let cleaned = (value * 1e6).round() / 1e6;
    format!("{cleaned}")
}
