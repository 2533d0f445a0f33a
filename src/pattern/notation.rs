// Wed Jan 15 2026 - Alex

use crate::pattern::PatternError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Textual form of a signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notation {
    /// `48 89 5C 24 08 ? ? 9A`
    #[default]
    Norm,
    /// `"\x48\x89\x5C\x24\x08\x00\x00\x9A", "xxxxx??x"`
    Code,
}

impl FromStr for Notation {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "norm" => Ok(Self::Norm),
            "code" => Ok(Self::Code),
            other => Err(PatternError::syntax(format!("unknown notation '{}' (expected norm or code)", other))),
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Norm => write!(f, "NORM"),
            Self::Code => write!(f, "CODE"),
        }
    }
}
