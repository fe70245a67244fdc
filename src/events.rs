use time::Date;
use tracing::info;

use crate::{
    description::{parse_dividend_ticker, parse_tax_ticker, DescriptionError},
    error::LedgerError,
    statement::{parse_amount, parse_date, Record, Statement},
    Result,
};

pub const DIVIDEND_EVENT: &str = "DIVIDENDO";
pub const BROKER: &str = "AVENUE";
pub const CURRENCY: &str = "USD";
/// Withholding at source; always zero for now.
pub const WITHHOLDING: f64 = 0.0;

const DIVIDEND_TOKEN: &str = "Dividendos";
const TAX_TOKEN: &str = "Impostos";

#[derive(Debug, Clone, PartialEq)]
pub struct DividendEvent {
    pub asset: String,
    pub date: Date,
    pub gross: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxEvent {
    pub date: Date,
    pub asset: String,
    pub tax: f64,
    pub broker: &'static str,
    pub currency: &'static str,
    pub withholding: f64,
}

fn ticker(
    record: &Record,
    parse: fn(&str) -> std::result::Result<&str, DescriptionError>,
) -> Result<String> {
    parse(&record.description)
        .map(str::to_string)
        .map_err(|reason| {
            LedgerError::MalformedDescription {
                line: record.line,
                description: record.description.clone(),
                reason,
            }
            .into()
        })
}

/// Dividend payments, in statement order, keyed by settlement date.
pub fn extract_dividends(statement: &Statement) -> Result<Vec<DividendEvent>> {
    let dividends = statement
        .records()
        .iter()
        .filter(|r| r.description.contains(DIVIDEND_TOKEN) && !r.description.contains(TAX_TOKEN))
        .map(|r| -> Result<DividendEvent> {
            Ok(DividendEvent {
                asset: ticker(r, parse_dividend_ticker)?,
                date: parse_date(&r.settlement, r.line)?,
                gross: parse_amount(&r.amount, r.line)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!(count = dividends.len(), "extracted dividends");
    Ok(dividends)
}

pub fn extract_taxes(statement: &Statement) -> Result<Vec<TaxEvent>> {
    let taxes = statement
        .records()
        .iter()
        .filter(|r| r.description.contains(TAX_TOKEN))
        .map(|r| -> Result<TaxEvent> {
            Ok(TaxEvent {
                date: parse_date(&r.settlement, r.line)?,
                asset: ticker(r, parse_tax_ticker)?,
                tax: parse_amount(&r.amount, r.line)?,
                broker: BROKER,
                currency: CURRENCY,
                withholding: WITHHOLDING,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    info!(count = taxes.len(), "extracted withholding taxes");
    Ok(taxes)
}
