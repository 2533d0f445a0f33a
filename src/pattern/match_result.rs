// Tue Jan 13 2026 - Alex

use crate::memory::Address;

/// Outcome of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Match addresses in ascending order.
    pub matches: Vec<Address>,
    /// Addresses where a region scan stopped because the byte could not be read.
    pub truncated: Vec<Address>,
    pub cancelled: bool,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn first(&self) -> Option<Address> {
        self.matches.first().copied()
    }

    /// First match at or after `reference`, falling back to the last match so
    /// that navigation lands somewhere whenever anything matched.
    pub fn nearest(&self, reference: Address) -> Option<Address> {
        nearest_match(&self.matches, reference)
    }

    pub(crate) fn merge(parts: Vec<ScanResult>) -> Self {
        let mut merged = ScanResult::default();
        for part in parts {
            merged.matches.extend(part.matches);
            merged.truncated.extend(part.truncated);
            merged.cancelled |= part.cancelled;
        }
        merged.matches.sort_unstable();
        merged.matches.dedup();
        merged.truncated.sort_unstable();
        merged.truncated.dedup();
        merged
    }
}

pub fn nearest_match(matches: &[Address], reference: Address) -> Option<Address> {
    matches
        .iter()
        .copied()
        .find(|&addr| addr >= reference)
        .or_else(|| matches.last().copied())
}
