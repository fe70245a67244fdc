use std::collections::{BTreeMap, HashMap, HashSet};

use time::Date;
use tracing::{debug, info};

use crate::{
    config::Summarize,
    error::{JoinSide, LedgerError},
    events::{DividendEvent, TaxEvent, DIVIDEND_EVENT, WITHHOLDING},
    statement::STATEMENT_DATE_FMT,
    Result,
};

pub const TOTAL_EVENT: &str = "TOTAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u8,
}

impl From<Date> for YearMonth {
    fn from(date: Date) -> Self {
        Self {
            year: date.year(),
            month: u8::from(date.month()),
        }
    }
}

/// A dividend with its withholding tax merged in, if one was charged.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub asset: String,
    pub date: Date,
    pub event: &'static str,
    pub net: f64,
    pub withholding: f64,
    pub currency: Option<&'static str>,
    pub broker: Option<&'static str>,
    pub gross: f64,
    pub tax: Option<f64>,
    pub month: YearMonth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub month: YearMonth,
    pub net: f64,
    pub gross: f64,
    pub tax: f64,
}

impl MonthlyTotal {
    pub fn event(&self) -> &'static str {
        TOTAL_EVENT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetRow {
    Dividend(LedgerRow),
    Total(MonthlyTotal),
}

impl SheetRow {
    pub fn event(&self) -> &'static str {
        match self {
            SheetRow::Dividend(row) => row.event,
            SheetRow::Total(total) => total.event(),
        }
    }

    pub fn net(&self) -> f64 {
        match self {
            SheetRow::Dividend(row) => row.net,
            SheetRow::Total(total) => total.net,
        }
    }

    pub fn is_total(&self) -> bool {
        matches!(self, SheetRow::Total(_))
    }
}

fn collision(side: JoinSide, date: Date, asset: &str) -> anyhow::Error {
    LedgerError::JoinKeyCollision {
        side,
        date: date
            .format(STATEMENT_DATE_FMT)
            .unwrap_or_else(|_| date.to_string()),
        asset: asset.to_string(),
    }
    .into()
}

/// Left join of `dividends` with `taxes` on (settlement date, asset).
///
/// Every dividend shows up exactly once. A key present twice on either side
/// is rejected, and taxes without a dividend are dropped. Rows come out
/// sorted by date, keeping extraction order within a date.
pub fn reconcile(dividends: &[DividendEvent], taxes: &[TaxEvent]) -> Result<Vec<LedgerRow>> {
    let mut taxes_by_key: HashMap<(Date, &str), &TaxEvent> = HashMap::with_capacity(taxes.len());
    for t in taxes {
        if taxes_by_key.insert((t.date, t.asset.as_str()), t).is_some() {
            return Err(collision(JoinSide::Taxes, t.date, &t.asset));
        }
    }

    let mut seen: HashSet<(Date, &str)> = HashSet::with_capacity(dividends.len());
    let mut rows = Vec::with_capacity(dividends.len());
    for d in dividends {
        let key = (d.date, d.asset.as_str());
        if !seen.insert(key) {
            return Err(collision(JoinSide::Dividends, d.date, &d.asset));
        }
        let tax = taxes_by_key.get(&key);
        rows.push(LedgerRow {
            asset: d.asset.clone(),
            date: d.date,
            event: DIVIDEND_EVENT,
            net: tax.map_or(d.gross, |t| d.gross + t.tax),
            withholding: tax.map_or(WITHHOLDING, |t| t.withholding),
            currency: tax.map(|t| t.currency),
            broker: tax.map(|t| t.broker),
            gross: d.gross,
            tax: tax.map(|t| t.tax),
            month: YearMonth::from(d.date),
        });
    }

    for t in taxes.iter().filter(|t| !seen.contains(&(t.date, t.asset.as_str()))) {
        debug!(asset = %t.asset, date = %t.date, tax = t.tax, "tax without matching dividend");
    }

    rows.sort_by_key(|r| r.date);
    info!(rows = rows.len(), "reconciled dividends with taxes");
    Ok(rows)
}

/// Inserts a TOTAL row after the last row of every month when enabled.
pub fn summarize(rows: Vec<LedgerRow>, summarize: Summarize) -> Vec<SheetRow> {
    if summarize == Summarize::Disabled {
        return rows.into_iter().map(SheetRow::Dividend).collect();
    }

    let mut totals: BTreeMap<YearMonth, (usize, MonthlyTotal)> = BTreeMap::new();
    for (pos, r) in rows.iter().enumerate() {
        let (last, total) = totals.entry(r.month).or_insert_with(|| {
            (
                pos,
                MonthlyTotal {
                    month: r.month,
                    net: 0.,
                    gross: 0.,
                    tax: 0.,
                },
            )
        });
        *last = pos;
        total.net += r.net;
        total.gross += r.gross;
        total.tax += r.tax.unwrap_or_default();
    }

    let mut after: HashMap<usize, MonthlyTotal> = totals.into_values().collect();
    let mut sheet = Vec::with_capacity(rows.len() + after.len());
    for (pos, r) in rows.into_iter().enumerate() {
        sheet.push(SheetRow::Dividend(r));
        if let Some(total) = after.remove(&pos) {
            sheet.push(SheetRow::Total(total));
        }
    }
    info!(
        months = sheet.iter().filter(|r| r.is_total()).count(),
        "added monthly totals"
    );
    sheet
}

/// Grand totals over the dividend rows of a sheet.
#[derive(Debug, Default, PartialEq)]
pub struct LedgerTotals {
    pub dividends: usize,
    pub gross: f64,
    pub tax: f64,
    pub net: f64,
}

impl LedgerTotals {
    pub fn from_rows(rows: &[SheetRow]) -> Self {
        let (dividends, gross, tax, net) = rows
            .iter()
            .filter_map(|r| match r {
                SheetRow::Dividend(row) => Some(row),
                SheetRow::Total(_) => None,
            })
            .fold((0, 0., 0., 0.), |(dividends, gross, tax, net), r| {
                (
                    dividends + 1,
                    gross + r.gross,
                    tax + r.tax.unwrap_or_default(),
                    net + r.net,
                )
            });
        Self {
            dividends,
            gross,
            tax,
            net,
        }
    }
}

pub fn print_totals(totals: &LedgerTotals) {
    println!("\n=== DIVIDENDS ({} payments) ===\n", totals.dividends);
    println!("Gross dividends (USD): ${:.2}", totals.gross);
    println!("Withheld taxes (USD): ${:.2}", totals.tax);
    println!("Net dividends (USD): ${:.2}", totals.net);
}
