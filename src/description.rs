//! Ticker extraction from the free-text `Descrição` column.
//!
//! Avenue writes dividend lines as `"Dividendos AAPL.US"` and the matching
//! withholding lines as `"Impostos Retidos AAPL.US"` or
//! `"Impostos sobre Dividendos AAPL.US"`. The ticker is always terminated by
//! the exchange suffix after a period.

use thiserror::Error;

const TAX_MARKER: &str = "dos";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("no space before the ticker")]
    MissingSpace,
    #[error("no \"dos\" marker before the ticker")]
    MissingMarker,
    #[error("no period after the ticker")]
    MissingPeriod,
    #[error("empty ticker")]
    EmptyTicker,
}

/// `<prefix> <TICKER>.<suffix>`: the text between the first space and the
/// first period that follows it.
pub fn parse_dividend_ticker(description: &str) -> Result<&str, DescriptionError> {
    let space = description
        .find(' ')
        .ok_or(DescriptionError::MissingSpace)?;
    ticker_until_period(&description[space + 1..])
}

/// `...dos <TICKER>.<suffix>`: the marker, one separator character, then the
/// ticker up to the next period.
pub fn parse_tax_ticker(description: &str) -> Result<&str, DescriptionError> {
    let marker = description
        .find(TAX_MARKER)
        .ok_or(DescriptionError::MissingMarker)?;
    let rest = &description[marker + TAX_MARKER.len()..];
    let mut chars = rest.chars();
    if chars.next().is_none() {
        return Err(DescriptionError::MissingPeriod);
    }
    ticker_until_period(chars.as_str())
}

fn ticker_until_period(rest: &str) -> Result<&str, DescriptionError> {
    let period = rest.find('.').ok_or(DescriptionError::MissingPeriod)?;
    let ticker = rest[..period].trim();
    if ticker.is_empty() {
        return Err(DescriptionError::EmptyTicker);
    }
    Ok(ticker)
}
