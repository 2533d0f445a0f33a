// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid pattern: {0}")]
    InvalidSyntax(String),
    #[error("Input does not contain any text")]
    EmptyInput,
    #[error("Unsupported context: {0}")]
    UnsupportedContext(String),
    #[error("No usable instruction at {0}")]
    InvalidInstruction(Address),
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),
}

impl PatternError {
    pub(crate) fn syntax(msg: impl Into<String>) -> Self {
        Self::InvalidSyntax(msg.into())
    }
}
