use std::{fs::File, io::Read, path::Path};

use anyhow::Context;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};
use tracing::info;

use crate::{error::LedgerError, Result};

pub(crate) static STATEMENT_DATE_FMT: &[BorrowedFormatItem] =
    format_description!("[day]/[month]/[year]");

const TIME_HEADER: &str = "Hora";
const DATE_HEADER: &str = "Data";
const SETTLEMENT_HEADER: &str = "Liquidação";
const DESCRIPTION_HEADER: &str = "Descrição";
const AMOUNT_HEADER: &str = "Valor (U$)";
const BALANCE_HEADER: &str = "Saldo da conta (U$)";

/// One statement line with the time and balance columns dropped.
///
/// Cells stay as written in the export; dates and amounts are only parsed
/// for the rows the extractors pick, through [`parse_date`] and
/// [`parse_amount`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub line: u64,
    pub date: String,
    pub settlement: String,
    pub description: String,
    pub amount: String,
}

/// Normalized statement, in file order.
#[derive(Debug, Default)]
pub struct Statement {
    records: Vec<Record>,
}

struct ColumnIndices {
    date: usize,
    settlement: usize,
    description: usize,
    amount: usize,
}

fn get_column_indices(headers: &csv::StringRecord) -> Result<ColumnIndices> {
    let mut time_index: Option<usize> = None;
    let mut date_index: Option<usize> = None;
    let mut settlement_index: Option<usize> = None;
    let mut description_index: Option<usize> = None;
    let mut amount_index: Option<usize> = None;
    let mut balance_index: Option<usize> = None;
    headers.iter().enumerate().for_each(|(pos, h)| {
        match h.trim_start_matches('\u{feff}').trim() {
            TIME_HEADER => time_index = Some(pos),
            DATE_HEADER => date_index = Some(pos),
            SETTLEMENT_HEADER => settlement_index = Some(pos),
            DESCRIPTION_HEADER => description_index = Some(pos),
            AMOUNT_HEADER => amount_index = Some(pos),
            BALANCE_HEADER => balance_index = Some(pos),
            _ => {}
        }
    });
    let require = |index: Option<usize>, column: &'static str| {
        index.ok_or(LedgerError::MalformedSchema { column })
    };
    // Time and balance are discarded, but a header without them is a
    // different export layout.
    require(time_index, TIME_HEADER)?;
    require(balance_index, BALANCE_HEADER)?;
    Ok(ColumnIndices {
        date: require(date_index, DATE_HEADER)?,
        settlement: require(settlement_index, SETTLEMENT_HEADER)?,
        description: require(description_index, DESCRIPTION_HEADER)?,
        amount: require(amount_index, AMOUNT_HEADER)?,
    })
}

/// `DD/MM/YYYY`, the only date layout of the export.
pub fn parse_date(value: &str, line: u64) -> Result<Date> {
    Date::parse(value.trim(), &STATEMENT_DATE_FMT).map_err(|_| {
        LedgerError::InvalidDate {
            line,
            value: value.to_string(),
        }
        .into()
    })
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Splits `s` on `sep` and checks the groups after the first are exactly
/// three digits.
fn is_grouped(s: &str, sep: char) -> bool {
    let mut groups = s.trim_start_matches(['-', '+']).split(sep);
    groups.next().is_some_and(is_digits) && groups.all(|g| g.len() == 3 && is_digits(g))
}

/// Decimal point amounts, optionally with `,` thousands (`1,234.56`).
/// The Brazilian layout is accepted when it cannot be mistaken for it:
/// `1.234,56`, or a single comma followed by one or two digits (`-1,50`).
/// Anything else, `1,000` included, is rejected.
pub fn parse_amount(value: &str, line: u64) -> Result<f64> {
    let trimmed = value.trim();
    let normalized = match (trimmed.rfind('.'), trimmed.rfind(',')) {
        (None, None) => Some(trimmed.to_string()),
        (Some(dot), None) if is_grouped(&trimmed[..dot], ',') => Some(trimmed.to_string()),
        (Some(dot), Some(comma)) if comma < dot && is_grouped(&trimmed[..dot], ',') => {
            Some(trimmed.replace(',', ""))
        }
        (Some(dot), Some(comma))
            if dot < comma
                && is_grouped(&trimmed[..comma], '.')
                && is_digits(&trimmed[comma + 1..]) =>
        {
            Some(trimmed.replace('.', "").replace(',', "."))
        }
        (None, Some(comma))
            if is_digits(trimmed[..comma].trim_start_matches(['-', '+']))
                && (1..=2).contains(&trimmed[comma + 1..].len())
                && is_digits(&trimmed[comma + 1..]) =>
        {
            Some(trimmed.replace(',', "."))
        }
        _ => None,
    };
    normalized
        .and_then(|n| n.parse::<f64>().ok())
        .ok_or_else(|| {
            LedgerError::InvalidAmount {
                line,
                value: value.to_string(),
            }
            .into()
        })
}

impl Statement {
    pub fn from_path<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|_| LedgerError::InputNotFound {
            path: path.to_path_buf(),
        })?;
        let statement = Self::from_reader(file)
            .with_context(|| format!("failed to load statement {}", path.display()))?;
        info!(
            path = %path.display(),
            records = statement.len(),
            "loaded statement"
        );
        Ok(statement)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .from_reader(reader);
        let columns = get_column_indices(rdr.headers().context("failed to read header row")?)?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row.context("failed to read statement row")?;
            // Header is line 1.
            let line = row
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 2);
            let field = |index: usize| row.get(index).unwrap_or_default().trim().to_string();
            records.push(Record {
                line,
                date: field(columns.date),
                settlement: field(columns.settlement),
                description: field(columns.description),
                amount: field(columns.amount),
            });
        }
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const HEADER: &str = "Data;Hora;Liquidação;Descrição;Valor (U$);Saldo da conta (U$)\n";

    fn ledger_error(err: &anyhow::Error) -> &LedgerError {
        err.downcast_ref::<LedgerError>()
            .expect("error should be a LedgerError")
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10.00", 2).unwrap(), 10.0);
        assert_eq!(parse_amount("-3", 2).unwrap(), -3.0);
        assert_eq!(parse_amount(" -1,50 ", 2).unwrap(), -1.5);
        assert_eq!(parse_amount("0,5", 2).unwrap(), 0.5);
        assert_eq!(parse_amount("1,234.56", 2).unwrap(), 1234.56);
        assert_eq!(parse_amount("-1,234,567.5", 2).unwrap(), -1234567.5);
        assert_eq!(parse_amount("1.234,56", 2).unwrap(), 1234.56);
        assert!(matches!(
            ledger_error(&parse_amount("abc", 7).unwrap_err()),
            LedgerError::InvalidAmount { line: 7, .. }
        ));
    }

    #[test]
    fn test_parse_amount_rejects_ambiguous_commas() {
        for value in ["1,000", "12,345", "1,2,3", "1,23.4", "1.2.3", "", "-", "1,"] {
            assert!(
                matches!(
                    ledger_error(&parse_amount(value, 3).unwrap_err()),
                    LedgerError::InvalidAmount { line: 3, .. }
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("01/03/2024", 2).unwrap(), date!(2024 - 03 - 01));
        assert!(matches!(
            ledger_error(&parse_date("2024-03-01", 4).unwrap_err()),
            LedgerError::InvalidDate { line: 4, .. }
        ));
        assert!(parse_date("31/02/2024", 4).is_err());
    }

    #[test]
    fn test_load_normalizes_columns() {
        let input = format!(
            "{HEADER}\
             28/02/2024;10:15:00;01/03/2024;Dividendos AAPL.US;10.00;110.00\n\
             28/02/2024;10:15:01;01/03/2024;Impostos Retidos AAPL.US;-1.50;108.50\n\
             05/03/2024;09:00:00;07/03/2024;Depósito;100.00;\n"
        );
        let statement = Statement::from_reader(input.as_bytes()).unwrap();
        assert_eq!(statement.len(), 3);
        assert_eq!(
            statement.records()[0],
            Record {
                line: 2,
                date: "28/02/2024".to_string(),
                settlement: "01/03/2024".to_string(),
                description: "Dividendos AAPL.US".to_string(),
                amount: "10.00".to_string(),
            }
        );
        assert_eq!(statement.records()[2].line, 4);
    }

    #[test]
    fn test_load_keeps_unparsed_cells() {
        let input = format!(
            "{HEADER}\
             28/02/2024;10:15:00;01/03/2024;Dividendos AAPL.US;10.00;-\n\
             29/02/2024;15:30:00;;Compra de MSFT.US;;-\n"
        );
        let statement = Statement::from_reader(input.as_bytes()).unwrap();
        assert_eq!(statement.len(), 2);
        assert_eq!(statement.records()[1].settlement, "");
        assert_eq!(statement.records()[1].amount, "");
    }

    #[test]
    fn test_header_with_bom_and_extra_columns() {
        let input = "\u{feff}Data;Hora;Liquidação;Descrição;Valor (U$);Saldo da conta (U$);Extra\n\
                     28/02/2024;10:15:00;01/03/2024;Dividendos KO.US;3.00;3.00;x\n";
        let statement = Statement::from_reader(input.as_bytes()).unwrap();
        assert_eq!(statement.records()[0].amount, "3.00");
    }

    #[test]
    fn test_missing_column() {
        let input = "Data;Hora;Liquidação;Descrição;Saldo da conta (U$)\n";
        let err = Statement::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(
            ledger_error(&err),
            LedgerError::MalformedSchema {
                column: "Valor (U$)"
            }
        ));

        let input = "Data;Liquidação;Descrição;Valor (U$);Saldo da conta (U$)\n";
        let err = Statement::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(
            ledger_error(&err),
            LedgerError::MalformedSchema { column: "Hora" }
        ));

        let input = "Data;Hora;Liquidação;Descrição;Valor (U$)\n";
        let err = Statement::from_reader(input.as_bytes()).unwrap_err();
        assert!(matches!(
            ledger_error(&err),
            LedgerError::MalformedSchema {
                column: "Saldo da conta (U$)"
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Statement::from_path("definitely/not/here.csv").unwrap_err();
        assert!(matches!(
            ledger_error(&err),
            LedgerError::InputNotFound { .. }
        ));
    }
}
