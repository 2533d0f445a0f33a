// Tue Jan 13 2026 - Alex

use crate::pattern::{ByteToken, PatternError};
use std::fmt;

/// A non-empty sequence of [`ByteToken`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    tokens: Vec<ByteToken>,
}

impl Pattern {
    pub fn new(tokens: Vec<ByteToken>) -> Result<Self, PatternError> {
        if tokens.is_empty() {
            return Err(PatternError::syntax("pattern has no byte tokens"));
        }
        Ok(Self { tokens })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PatternError> {
        Self::new(bytes.iter().copied().map(ByteToken::from).collect())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[ByteToken] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<ByteToken> {
        self.tokens
    }

    pub fn significant_byte_count(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_wildcard()).count()
    }

    pub fn wildcard_byte_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_wildcard()).count()
    }

    /// True when `data` starts with this pattern.
    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.tokens.len() {
            return false;
        }

        self.tokens
            .iter()
            .zip(data.iter())
            .all(|(token, &byte)| token.matches(byte))
    }

    /// Every offset in `data` where the pattern matches, ascending.
    pub fn find_all_in(&self, data: &[u8]) -> Vec<usize> {
        let mut results = Vec::new();

        if data.len() < self.tokens.len() {
            return results;
        }

        let anchor = self
            .tokens
            .iter()
            .enumerate()
            .find_map(|(i, t)| t.to_byte().map(|b| (i, b)));

        for i in 0..=(data.len() - self.tokens.len()) {
            if let Some((pos, byte)) = anchor {
                if data[i + pos] != byte {
                    continue;
                }
            }
            if self.matches(&data[i..]) {
                results.push(i);
            }
        }

        results
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PatternBuilder {
    tokens: Vec<ByteToken>,
}

impl PatternBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn byte(mut self, b: u8) -> Self {
        self.tokens.push(ByteToken::Exact(b));
        self
    }

    pub fn bytes(mut self, bs: &[u8]) -> Self {
        self.tokens.extend(bs.iter().copied().map(ByteToken::Exact));
        self
    }

    pub fn wildcard(mut self) -> Self {
        self.tokens.push(ByteToken::Wildcard);
        self
    }

    pub fn wildcards(mut self, count: usize) -> Self {
        self.tokens.extend(std::iter::repeat(ByteToken::Wildcard).take(count));
        self
    }

    pub fn tokens(mut self, tokens: &[ByteToken]) -> Self {
        self.tokens.extend_from_slice(tokens);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn build(self) -> Result<Pattern, PatternError> {
        Pattern::new(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(Pattern::new(Vec::new()), Err(PatternError::InvalidSyntax(_))));
        assert!(PatternBuilder::new().build().is_err());
    }

    #[test]
    fn test_builder() {
        let pattern = PatternBuilder::new()
            .bytes(&[0x48, 0x8B])
            .wildcards(2)
            .byte(0x89)
            .build()
            .unwrap();
        assert_eq!(pattern.len(), 5);
        assert_eq!(pattern.significant_byte_count(), 3);
        assert_eq!(pattern.wildcard_byte_count(), 2);
        assert_eq!(pattern.to_string(), "48 8B ? ? 89");
    }

    #[test]
    fn test_wildcard_middle_matches_any_byte() {
        let pattern = PatternBuilder::new().byte(0xAA).wildcard().byte(0xCC).build().unwrap();
        for middle in 0..=255u8 {
            assert!(pattern.matches(&[0xAA, middle, 0xCC]));
        }
        assert!(!pattern.matches(&[0xAA, 0xBB, 0xDD]));
        assert!(!pattern.matches(&[0xAA, 0xBB]));
    }

    #[test]
    fn test_find_all_in_overlapping() {
        let pattern = Pattern::from_bytes(&[0xAA, 0xAA]).unwrap();
        assert_eq!(pattern.find_all_in(&[0xAA, 0xAA, 0xAA]), vec![0, 1]);
    }

    #[test]
    fn test_find_all_in_leading_wildcard() {
        let pattern = PatternBuilder::new().wildcard().byte(0x90).build().unwrap();
        assert_eq!(pattern.find_all_in(&[0x90, 0x90, 0x00, 0x90]), vec![0, 2]);

        let all_wild = PatternBuilder::new().wildcards(2).build().unwrap();
        assert_eq!(all_wild.find_all_in(&[1, 2, 3]), vec![0, 1]);
    }
}
