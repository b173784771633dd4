//! Public models for the `dataset-lookup` module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::LookupError;

/// A value as displayed in a spreadsheet cell.
///
/// Deserializes from any JSON scalar; `null` maps to `Empty`.
///
/// There is no list or record variant. Array and object values returned by
/// the lookup service are shown as `Text` holding their compact JSON, e.g.
/// `{"unit":"kg"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Text cell value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Whether the value counts as a usable lookup result.
    ///
    /// Empty, blank text and `false` are treated as "no value".
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::Empty => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Lookup kind carried in a batched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Operation {
    /// Indicator lookup (`GET(name, indicator, module)`).
    Get,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spreadsheet function names exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    /// `GET(name, indicator, module)`, batched.
    Get,
    /// `INFO(name, info)`
    Info,
    /// `LIFE(name)`
    Life,
    /// `DATA(name)`
    Data,
}

impl FunctionName {
    pub const ALL: [FunctionName; 4] = [Self::Get, Self::Info, Self::Life, Self::Data];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Info => "info",
            Self::Life => "life",
            Self::Data => "data",
        }
    }

    /// Number of string arguments the function takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Get => 3,
            Self::Info => 2,
            Self::Life | Self::Data => 1,
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionName {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LookupError::unknown_function(trimmed))
    }
}
