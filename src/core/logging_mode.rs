//! Logging mode definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When a table writes a row on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LoggingMode {
    /// Log on every tick
    Automatic,
    /// Log on ticks where every registered criteria holds
    Criteria,
    /// Log only when asked explicitly
    #[default]
    Manual,
}

impl LoggingMode {
    pub fn to_str(&self) -> &'static str {
        match self {
            LoggingMode::Automatic => "AUTOMATIC",
            LoggingMode::Criteria => "CRITERIA",
            LoggingMode::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for LoggingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LoggingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AUTOMATIC" | "AUTO" => Ok(LoggingMode::Automatic),
            "CRITERIA" | "CONDITIONAL" => Ok(LoggingMode::Criteria),
            "MANUAL" => Ok(LoggingMode::Manual),
            _ => Err(format!("Invalid logging mode: '{}'", s)),
        }
    }
}
