// Tue Jan 13 2026 - Alex

use crate::memory::Address;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Out of bounds: {len} byte(s) at {address} not in range")]
    OutOfBounds { address: Address, len: usize },
    #[error("Binary parse error: {0}")]
    BinaryParse(String),
    #[error("Not supported: {0}")]
    NotSupported(String),
}
