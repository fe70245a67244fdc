use std::path::{Path, PathBuf};

use anyhow::Context;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::{
    ledger::{LedgerRow, MonthlyTotal, SheetRow},
    statement::STATEMENT_DATE_FMT,
    Result,
};

const XLSX_EXTENSION: &str = "xlsx";

pub const COLUMNS: [&str; 9] = [
    "ativo",
    "data",
    "evento",
    "valorLiq",
    "irrf",
    "moeda",
    "corretora",
    "valorBruto",
    "imposto",
];

/// Appends `.xlsx` to `name` unless it already carries it.
pub fn output_path(name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(XLSX_EXTENSION) => path,
        _ => PathBuf::from(format!("{name}.{XLSX_EXTENSION}")),
    }
}

fn write_dividend(sheet: &mut Worksheet, row: u32, r: &LedgerRow, money: &Format) -> Result<()> {
    sheet.write_string(row, 0, r.asset.as_str())?;
    sheet.write_string(row, 1, r.date.format(STATEMENT_DATE_FMT)?)?;
    sheet.write_string(row, 2, r.event)?;
    sheet.write_number_with_format(row, 3, r.net, money)?;
    sheet.write_number_with_format(row, 4, r.withholding, money)?;
    if let Some(currency) = r.currency {
        sheet.write_string(row, 5, currency)?;
    }
    if let Some(broker) = r.broker {
        sheet.write_string(row, 6, broker)?;
    }
    sheet.write_number_with_format(row, 7, r.gross, money)?;
    if let Some(tax) = r.tax {
        sheet.write_number_with_format(row, 8, tax, money)?;
    }
    Ok(())
}

fn write_total(sheet: &mut Worksheet, row: u32, t: &MonthlyTotal, money: &Format) -> Result<()> {
    sheet.write_string(row, 2, t.event())?;
    sheet.write_number_with_format(row, 3, t.net, money)?;
    sheet.write_number_with_format(row, 7, t.gross, money)?;
    sheet.write_number_with_format(row, 8, t.tax, money)?;
    Ok(())
}

/// Builds the whole workbook in memory and saves it in one go, so nothing
/// is written to `file_path` if any row fails.
pub fn write_ledger<P: AsRef<Path>>(rows: &[SheetRow], file_path: P) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        match r {
            SheetRow::Dividend(d) => write_dividend(sheet, row, d, &money)?,
            SheetRow::Total(t) => write_total(sheet, row, t, &money)?,
        }
    }

    workbook
        .save(file_path.as_ref())
        .with_context(|| format!("failed to write {}", file_path.as_ref().display()))?;
    println!(
        "The dividend ledger was written to file {}",
        file_path.as_ref().to_string_lossy()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_extension() {
        assert_eq!(
            output_path("proventos_avenue"),
            PathBuf::from("proventos_avenue.xlsx")
        );
        assert_eq!(output_path("out.XLSX"), PathBuf::from("out.XLSX"));
        assert_eq!(output_path("report.2024"), PathBuf::from("report.2024.xlsx"));
        assert_eq!(output_path("dir/out.csv"), PathBuf::from("dir/out.csv.xlsx"));
    }
}
