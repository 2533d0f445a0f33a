// Tue Jan 15 2026 - Alex

pub mod analysis;
pub mod config;
pub mod memory;
pub mod pattern;
pub mod ui;
pub mod utils;

pub use analysis::{InstructionInfo, InstructionMap, SignatureEncoder};
pub use config::Config;
pub use memory::{Address, ByteSource};
pub use pattern::{Notation, Pattern, PatternError, PatternScanner, ScanResult};
