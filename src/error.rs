use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::description::DescriptionError;

/// Which side of the dividend/tax join carried a duplicated key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Dividends,
    Taxes,
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::Dividends => write!(f, "dividends"),
            JoinSide::Taxes => write!(f, "taxes"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("input file {} does not exist or cannot be read", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("missing column \"{column}\" in statement header")]
    MalformedSchema { column: &'static str },

    #[error("line {line}: invalid date \"{value}\", expected DD/MM/YYYY")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid amount \"{value}\"")]
    InvalidAmount { line: u64, value: String },

    #[error("line {line}: cannot extract ticker from \"{description}\": {reason}")]
    MalformedDescription {
        line: u64,
        description: String,
        reason: DescriptionError,
    },

    #[error("duplicate {side} entry for {asset} on {date}")]
    JoinKeyCollision {
        side: JoinSide,
        date: String,
        asset: String,
    },
}
