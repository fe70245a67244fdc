//! Turns an Avenue account statement (`report-statement-BR.csv`) into a
//! dividend ledger spreadsheet: one row per dividend with its withholding tax
//! netted in, optionally followed by a TOTAL row for every month.

use std::path::PathBuf;

use anyhow::Error;
use tracing::{info, warn};

pub mod config;
pub mod description;
pub mod error;
pub mod events;
pub mod ledger;
pub mod sheet;
pub mod statement;

pub use config::{Config, Summarize};
pub use error::LedgerError;
pub use ledger::{LedgerRow, LedgerTotals, MonthlyTotal, SheetRow};
pub use statement::Statement;

pub type Result<T> = std::result::Result<T, Error>;

/// Extracts, reconciles and optionally summarizes a loaded statement.
pub fn build_ledger(statement: &Statement, summarize: Summarize) -> Result<Vec<SheetRow>> {
    let dividends = events::extract_dividends(statement)?;
    let taxes = events::extract_taxes(statement)?;
    let rows = ledger::reconcile(&dividends, &taxes)?;
    if rows.is_empty() {
        warn!("no dividends found in statement");
    }
    Ok(ledger::summarize(rows, summarize))
}

/// Runs the whole conversion and returns the path of the written workbook.
pub fn run(config: &Config) -> Result<PathBuf> {
    info!(
        input = %config.input.display(),
        summarize = %config.summarize,
        output = %config.output,
        "converting statement"
    );
    let statement = Statement::from_path(&config.input)?;
    let rows = build_ledger(&statement, config.summarize)?;

    let output = sheet::output_path(&config.output);
    sheet::write_ledger(&rows, &output)?;
    ledger::print_totals(&LedgerTotals::from_rows(&rows));
    Ok(output)
}
