// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How matrix cells are rendered when the matrix is serialized.
///
/// - `Fixed`: fixed-point notation, e.g. `0.500000` at precision 6.
/// - `Scientific`: exponent notation, e.g. `5.0e-1` at precision 1.
///
/// Callers must pick one explicitly; there is no silent default buried in the
/// writer itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatFormat {
    Fixed,
    Scientific,
}

impl Default for FloatFormat {
    fn default() -> Self {
        FloatFormat::Fixed
    }
}

impl FromStr for FloatFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Ok(FloatFormat::Fixed),
            "scientific" => Ok(FloatFormat::Scientific),
            other => Err(format!(
                "invalid float format: {other} (expected \"fixed\" or \"scientific\")"
            )),
        }
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatFormat::Fixed => write!(f, "fixed"),
            FloatFormat::Scientific => write!(f, "scientific"),
        }
    }
}
