// Tue Jan 13 2026 - Alex

pub mod error;
pub mod format;
pub mod match_result;
pub mod notation;
pub mod parse;
pub mod pattern;
pub mod scanner;
pub mod token;

pub use error::PatternError;
pub use format::{render, render_code, render_norm, DEFAULT_WILDCARD, RAW_MARKER};
pub use match_result::{nearest_match, ScanResult};
pub use notation::Notation;
pub use parse::{parse, parse_code, parse_norm};
pub use pattern::{Pattern, PatternBuilder};
pub use scanner::{Matches, PatternScanner, ScanCursor};
pub use token::ByteToken;

use crate::memory::ByteSource;

/// Parses `text` and scans the whole of `source` for it.
pub fn find_signature(
    source: &dyn ByteSource,
    text: &str,
    notation: Notation,
    wildcard_alias: Option<&str>,
) -> Result<ScanResult, PatternError> {
    let pattern = parse(text, notation, wildcard_alias)?;
    Ok(PatternScanner::new().scan(source, &pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Address, BufferMemory};

    #[test]
    fn test_find_signature() {
        let source = BufferMemory::new(Address::new(0x2000), vec![0x00, 0xE8, 0x11, 0x22, 0xC3, 0xE8, 0x33, 0x44, 0xC3]);

        let result = find_signature(&source, "E8 ?? ?? C3", Notation::Norm, None).unwrap();
        assert_eq!(result.matches, vec![Address::new(0x2001), Address::new(0x2005)]);

        let result = find_signature(&source, r#""\xE8\x00\x00\xC3", "x??x""#, Notation::Code, None).unwrap();
        assert_eq!(result.len(), 2);

        assert!(matches!(
            find_signature(&source, "   ", Notation::Norm, None),
            Err(PatternError::EmptyInput)
        ));
    }
}
