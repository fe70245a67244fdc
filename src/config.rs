use std::{fmt, path::PathBuf, str::FromStr};

use anyhow::Error;

pub const DEFAULT_INPUT: &str = "report-statement-BR.csv";
pub const DEFAULT_OUTPUT: &str = "proventos_avenue";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Summarize {
    Enabled,
    #[default]
    Disabled,
}

impl FromStr for Summarize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" | "on" | "enabled" => Ok(Summarize::Enabled),
            "false" | "no" | "n" | "0" | "off" | "disabled" => Ok(Summarize::Disabled),
            other => Err(Error::msg(format!(
                "invalid summarize flag \"{other}\", expected true or false"
            ))),
        }
    }
}

impl fmt::Display for Summarize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summarize::Enabled => write!(f, "enabled"),
            Summarize::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub summarize: Summarize,
    /// Base name of the workbook; `.xlsx` is appended when missing.
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            summarize: Summarize::default(),
            output: DEFAULT_OUTPUT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_flag_spellings() {
        for s in ["true", "TRUE", " yes ", "1", "on", "Enabled"] {
            assert_eq!(s.parse::<Summarize>().unwrap(), Summarize::Enabled, "{s}");
        }
        for s in ["false", "No", "0", "off", "disabled"] {
            assert_eq!(s.parse::<Summarize>().unwrap(), Summarize::Disabled, "{s}");
        }
        assert!("maybe".parse::<Summarize>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input, PathBuf::from("report-statement-BR.csv"));
        assert_eq!(config.summarize, Summarize::Disabled);
        assert_eq!(config.output, "proventos_avenue");
    }
}
