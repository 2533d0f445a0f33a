// Tue Jan 13 2026 - Alex

use crate::memory::Address;
use std::fmt;

/// Half-open address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    start: Address,
    end: Address,
}

impl MemoryRange {
    pub fn new(start: Address, end: Address) -> Self {
        assert!(end >= start, "end must be >= start");
        Self { start, end }
    }

    /// The end is clamped to the top of the address space.
    pub fn from_start_size(start: Address, size: u64) -> Self {
        Self::new(start, start.checked_add(size).unwrap_or(Address::new(u64::MAX)))
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.start, self.end)
    }

    /// True when `[addr, addr + len)` lies fully inside this range.
    pub fn contains_span(&self, addr: Address, len: u64) -> bool {
        match addr.checked_add(len) {
            Some(end) => addr >= self.start && end <= self.end,
            None => false,
        }
    }

    pub fn intersects(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Self::new(start, end))
        } else {
            None
        }
    }

    /// Splits the range into windows of `chunk_size` owned bytes, each extended
    /// by up to `overlap` bytes past its owned end (clipped to the range).
    /// Returns `(window, owned_end)` pairs.
    pub fn chunks(&self, chunk_size: u64, overlap: u64) -> Vec<(MemoryRange, Address)> {
        let step = chunk_size.max(1);
        let mut chunks = Vec::new();
        let mut start = self.start;
        while start < self.end {
            let owned_end = start.checked_add(step).map_or(self.end, |e| e.min(self.end));
            let window_end = owned_end.checked_add(overlap).map_or(self.end, |e| e.min(self.end));
            chunks.push((MemoryRange::new(start, window_end), owned_end));
            start = owned_end;
        }
        chunks
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_span() {
        let range = MemoryRange::from_start_size(Address::new(0x100), 0x10);
        assert!(range.contains_span(Address::new(0x100), 0x10));
        assert!(!range.contains_span(Address::new(0x108), 0x10));
        assert!(!range.contains_span(Address::new(0xff), 1));
        assert!(!range.contains_span(Address::new(u64::MAX), 2));
    }

    #[test]
    fn test_from_start_size_clamps_at_top() {
        let range = MemoryRange::from_start_size(Address::new(u64::MAX - 2), 8);
        assert_eq!(range.end(), Address::new(u64::MAX));
        assert_eq!(range.size(), 2);
    }

    #[test]
    fn test_chunks_overlap() {
        let range = MemoryRange::from_start_size(Address::new(0), 10);
        let chunks = range.chunks(4, 2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].0, MemoryRange::new(Address::new(0), Address::new(6)));
        assert_eq!(chunks[0].1, Address::new(4));
        assert_eq!(chunks[1].0, MemoryRange::new(Address::new(4), Address::new(10)));
        assert_eq!(chunks[2].0, MemoryRange::new(Address::new(8), Address::new(10)));
        assert_eq!(chunks[2].1, Address::new(10));
    }

    #[test]
    fn test_intersects() {
        let a = MemoryRange::new(Address::new(0), Address::new(10));
        let b = MemoryRange::new(Address::new(5), Address::new(20));
        assert_eq!(a.intersects(&b), Some(MemoryRange::new(Address::new(5), Address::new(10))));
        let c = MemoryRange::new(Address::new(10), Address::new(20));
        assert_eq!(a.intersects(&c), None);
    }
}
