use std::io::Write;

use fundscope_core::{analyze_input, HistoryRange, MarketDataProvider};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

const QUIT_WORDS: [&str; 2] = ["quit", "exit"];

/// Rendering options shared by one-shot and interactive mode.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    pub range: HistoryRange,
}

/// Analyze one symbol and write the report; query failures are returned.
pub async fn run_once<W: Write>(
    provider: &dyn MarketDataProvider,
    raw_symbol: &str,
    options: RenderOptions,
    out: &mut W,
) -> Result<(), CliError> {
    let report = analyze_input(provider, raw_symbol, options.range).await?;
    writeln!(out, "{}", output::render(&report, options.format, options.pretty)?)?;
    Ok(())
}

/// Read symbols line by line until EOF or a quit word. Each line is an
/// independent query; its failure is printed and the loop continues.
pub async fn run_interactive<R, W, P>(
    provider: &dyn MarketDataProvider,
    input: R,
    options: RenderOptions,
    out: &mut W,
    mut prompt: P,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    P: FnMut() -> std::io::Result<()>,
{
    let mut lines = input.lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if QUIT_WORDS.iter().any(|word| query.eq_ignore_ascii_case(word)) {
            break;
        }

        match run_once(provider, query, options, out).await {
            Ok(()) => {}
            Err(CliError::Report(error)) => writeln!(out, "{}", output::render_error(&error))?,
            Err(other) => return Err(other),
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One-shot failures still need the user-facing wording before exiting.
pub fn describe_failure(error: &CliError) -> String {
    match error {
        CliError::Report(report_error) => output::render_error(report_error),
        other => format!("Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fundscope_core::YahooAdapter;

    fn options(format: OutputFormat) -> RenderOptions {
        RenderOptions {
            format,
            pretty: false,
            range: HistoryRange::OneYear,
        }
    }

    #[tokio::test]
    async fn one_shot_writes_text_report() {
        let adapter = YahooAdapter::mock();
        let mut out = Vec::new();

        run_once(&adapter, "spy", options(OutputFormat::Text), &mut out)
            .await
            .expect("report");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.starts_with("Results for SPY"));
        assert!(text.contains("Final Verdict: "));
    }

    #[tokio::test]
    async fn one_shot_propagates_no_data() {
        let adapter = YahooAdapter::mock();
        let mut out = Vec::new();

        let error = run_once(&adapter, "empty", options(OutputFormat::Text), &mut out)
            .await
            .expect_err("must fail");

        assert_eq!(error.exit_code(), 3);
        assert_eq!(
            describe_failure(&error),
            "No data found. Check the symbol and try again."
        );
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn interactive_session_handles_each_line_independently() {
        let adapter = YahooAdapter::mock();
        let input: &[u8] = b"vti\n\n  empty \n1bad\nqqq\nquit\nspy\n";
        let mut out = Vec::new();
        let mut prompts = 0;

        run_interactive(&adapter, input, options(OutputFormat::Text), &mut out, || {
            prompts += 1;
            Ok(())
        })
        .await
        .expect("session");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Results for VTI"));
        assert!(text.contains("No data found. Check the symbol and try again."));
        assert!(text.contains("Error: symbol must start with an ASCII letter or '^': '1'"));
        assert!(text.contains("Results for QQQ"));
        assert!(!text.contains("Results for SPY"), "input after quit is ignored");
        assert_eq!(prompts, 6);
    }

    #[tokio::test]
    async fn interactive_json_emits_one_document_per_query() {
        let adapter = YahooAdapter::mock();
        let input: &[u8] = b"vti\nqqq\n";
        let mut out = Vec::new();

        run_interactive(&adapter, input, options(OutputFormat::Json), &mut out, || Ok(()))
            .await
            .expect("session");

        let text = String::from_utf8(out).expect("utf8");
        let documents = text
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
            .collect::<Vec<_>>();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1]["symbol"], "QQQ");
    }
}
