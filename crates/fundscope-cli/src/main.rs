mod cli;
mod commands;
mod error;
mod output;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use fundscope_core::{MarketDataProvider, YahooAdapter};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::RenderOptions;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", commands::describe_failure(&error));
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let adapter = if cli.mock {
        YahooAdapter::mock()
    } else {
        YahooAdapter::live()?.with_timeout_ms(cli.timeout_ms)
    };
    tracing::debug!(live = adapter.is_live(), provider = %adapter.id(), "provider ready");

    let options = RenderOptions {
        format: cli.format,
        pretty: cli.pretty,
        range: cli.range.into(),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.symbol.as_deref() {
        Some(symbol) => commands::run_once(&adapter, symbol, options, &mut out).await,
        None => {
            eprintln!("Enter any US ETF symbol (e.g., SPY, QQQ, VTI, ARKK, INDA); 'quit' to exit.");
            let input = BufReader::new(tokio::io::stdin());
            commands::run_interactive(&adapter, input, options, &mut out, || {
                let mut stderr = io::stderr();
                write!(stderr, "ETF Symbol> ")?;
                stderr.flush()
            })
            .await
        }
    }
}
