use std::path::PathBuf;

use avenue_dividends::{
    config::{DEFAULT_INPUT, DEFAULT_OUTPUT},
    run, Config, Result, Summarize,
};
use clap::Parser;

/// Builds a dividend ledger spreadsheet from an Avenue statement export.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Semicolon-delimited statement exported from Avenue
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Add a TOTAL row after each month (true/false)
    #[arg(default_value_t = Summarize::Disabled)]
    summarize: Summarize,

    /// Output workbook name, .xlsx is appended when missing
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: String,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            input: args.input,
            summarize: args.summarize,
            output: args.output,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from(Args::parse());
    run(&config)?;
    Ok(())
}
