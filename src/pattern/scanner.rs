// Tue Jan 13 2026 - Alex

use crate::memory::{Address, ByteSource, MemoryRange};
use crate::pattern::{ByteToken, Pattern, ScanResult};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const CANCEL_CHECK_INTERVAL: u64 = 0x1000;

pub struct PatternScanner {
    chunk_size: usize,
    use_parallel: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl PatternScanner {
    pub fn new() -> Self {
        Self {
            chunk_size: 0x10000,
            use_parallel: false,
            cancel: None,
        }
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    pub fn use_parallel(mut self, parallel: bool) -> Self {
        self.use_parallel = parallel;
        self
    }

    /// Scans stop shortly after `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Lazily yields every match over all regions of `source`, ascending.
    pub fn matches<'a>(&'a self, source: &'a dyn ByteSource, pattern: &'a Pattern) -> Matches<'a> {
        Matches::new(self, source, pattern, source.regions(), Address::zero())
    }

    /// Like [`matches`](Self::matches) but starts at `from`.
    pub fn matches_from<'a>(
        &'a self,
        source: &'a dyn ByteSource,
        pattern: &'a Pattern,
        from: Address,
    ) -> Matches<'a> {
        Matches::new(self, source, pattern, source.regions(), from)
    }

    pub fn matches_in<'a>(
        &'a self,
        source: &'a dyn ByteSource,
        pattern: &'a Pattern,
        range: MemoryRange,
    ) -> Matches<'a> {
        let ranges = source
            .regions()
            .iter()
            .filter_map(|region| region.intersects(&range))
            .collect();
        Matches::new(self, source, pattern, ranges, range.start())
    }

    pub fn find_next(&self, source: &dyn ByteSource, pattern: &Pattern, from: Address) -> Option<Address> {
        self.matches_from(source, pattern, from).next()
    }

    pub fn scan(&self, source: &dyn ByteSource, pattern: &Pattern) -> ScanResult {
        if self.use_parallel {
            self.scan_parallel(source, pattern, source.regions())
        } else {
            self.matches(source, pattern).into_result()
        }
    }

    pub fn scan_range(&self, source: &dyn ByteSource, range: MemoryRange, pattern: &Pattern) -> ScanResult {
        if self.use_parallel {
            let ranges = source
                .regions()
                .iter()
                .filter_map(|region| region.intersects(&range))
                .collect();
            self.scan_parallel(source, pattern, ranges)
        } else {
            self.matches_in(source, pattern, range).into_result()
        }
    }

    /// Splits every range into chunks overlapping by `pattern.len() - 1` bytes
    /// and matches them on the rayon pool. A chunk only reports matches that
    /// start inside its owned part, so nothing is reported twice.
    fn scan_parallel(&self, source: &dyn ByteSource, pattern: &Pattern, ranges: Vec<MemoryRange>) -> ScanResult {
        let overlap = pattern.len().saturating_sub(1) as u64;
        let chunks: Vec<_> = ranges
            .iter()
            .flat_map(|range| range.chunks(self.chunk_size as u64, overlap))
            .collect();

        log::debug!("Parallel scan over {} chunk(s)", chunks.len());

        let parts: Vec<ScanResult> = chunks
            .par_iter()
            .map(|&(window, owned_end)| {
                if self.is_cancelled() {
                    return ScanResult { cancelled: true, ..Default::default() };
                }

                match source.read_bytes(window.start(), window.size() as usize) {
                    Ok(data) => ScanResult {
                        matches: pattern
                            .find_all_in(&data)
                            .into_iter()
                            .map(|offset| window.start() + offset as u64)
                            .filter(|&addr| addr < owned_end)
                            .collect(),
                        ..Default::default()
                    },
                    Err(_) => {
                        let mut part = Matches::new(self, source, pattern, vec![window], window.start())
                            .into_result();
                        part.matches.retain(|&addr| addr < owned_end);
                        part
                    }
                }
            })
            .collect();

        ScanResult::merge(parts)
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of the current match attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCursor {
    candidate: Address,
    matched: usize,
}

impl ScanCursor {
    pub fn candidate(&self) -> Address {
        self.candidate
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    fn advance(&mut self, addr: Address) {
        if self.matched == 0 {
            self.candidate = addr;
        }
        self.matched += 1;
    }

    /// Drops the partial match and returns where the next attempt begins.
    fn restart(&mut self) -> Address {
        let next = self.candidate + 1;
        *self = Self::default();
        next
    }
}

enum Step {
    Found(Address),
    Truncated(Address),
    Exhausted,
    Cancelled,
}

enum ReadStop {
    Failed,
    Cancelled,
}

/// Serves single bytes out of chunk-sized reads. The cancel flag is checked
/// before every refill.
struct ChunkReader<'a> {
    source: &'a dyn ByteSource,
    cancel: Option<&'a AtomicBool>,
    end: Address,
    chunk_size: usize,
    base: Address,
    buf: Vec<u8>,
}

impl<'a> ChunkReader<'a> {
    fn new(source: &'a dyn ByteSource, cancel: Option<&'a AtomicBool>, end: Address, chunk_size: usize) -> Self {
        Self {
            source,
            cancel,
            end,
            chunk_size,
            base: Address::zero(),
            buf: Vec::new(),
        }
    }

    fn byte_at(&mut self, addr: Address) -> Result<u8, ReadStop> {
        if addr >= self.base && addr - self.base < self.buf.len() as u64 {
            return Ok(self.buf[(addr - self.base) as usize]);
        }
        self.refill(addr)?;
        self.buf.first().copied().ok_or(ReadStop::Failed)
    }

    fn refill(&mut self, addr: Address) -> Result<(), ReadStop> {
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(ReadStop::Cancelled);
        }

        let len = (self.end - addr).min(self.chunk_size as u64) as usize;
        let buf = match self.source.read_bytes(addr, len) {
            Ok(buf) => buf,
            Err(_) => match self.source.read_bytes(addr, 1) {
                Ok(buf) => buf,
                Err(e) => {
                    log::debug!("Read failed at {}: {}", addr, e);
                    return Err(ReadStop::Failed);
                }
            },
        };
        self.base = addr;
        self.buf = buf;
        Ok(())
    }
}

/// Lazy, ascending iterator over match addresses. Overlapping matches are all
/// reported: after a match at `a` the search resumes at `a + 1`.
pub struct Matches<'a> {
    scanner: &'a PatternScanner,
    source: &'a dyn ByteSource,
    pattern: &'a Pattern,
    ranges: Vec<MemoryRange>,
    index: usize,
    reader: Option<ChunkReader<'a>>,
    position: Address,
    truncated: Vec<Address>,
    cancelled: bool,
}

impl<'a> Matches<'a> {
    fn new(
        scanner: &'a PatternScanner,
        source: &'a dyn ByteSource,
        pattern: &'a Pattern,
        ranges: Vec<MemoryRange>,
        from: Address,
    ) -> Self {
        Self {
            scanner,
            source,
            pattern,
            ranges,
            index: 0,
            reader: None,
            position: from,
            truncated: Vec::new(),
            cancelled: false,
        }
    }

    /// Address the next search starts from.
    pub fn position(&self) -> Address {
        self.position
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Drains the remaining matches into a [`ScanResult`].
    pub fn into_result(mut self) -> ScanResult {
        let matches = self.by_ref().collect();
        ScanResult {
            matches,
            truncated: self.truncated,
            cancelled: self.cancelled,
        }
    }

    fn next_range(&mut self) {
        self.index += 1;
        self.reader = None;
    }

    fn search(&mut self, end: Address) -> Step {
        let tokens: &[ByteToken] = self.pattern.tokens();
        let Some(reader) = self.reader.as_mut() else {
            return Step::Exhausted;
        };

        let mut cursor = ScanCursor::default();
        let mut addr = self.position;
        let mut steps: u64 = 0;

        while addr < end {
            steps += 1;
            if steps % CANCEL_CHECK_INTERVAL == 0 && self.scanner.is_cancelled() {
                return Step::Cancelled;
            }

            let byte = match reader.byte_at(addr) {
                Ok(byte) => byte,
                Err(ReadStop::Failed) => return Step::Truncated(addr),
                Err(ReadStop::Cancelled) => return Step::Cancelled,
            };

            if tokens[cursor.matched()].matches(byte) {
                cursor.advance(addr);
                if cursor.matched() == tokens.len() {
                    return Step::Found(cursor.candidate());
                }
                addr = addr + 1;
            } else if cursor.matched() > 0 {
                addr = cursor.restart();
            } else {
                addr = addr + 1;
            }
        }

        Step::Exhausted
    }
}

impl Iterator for Matches<'_> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        loop {
            if self.cancelled {
                return None;
            }

            let range = *self.ranges.get(self.index)?;
            if self.position >= range.end() {
                self.next_range();
                continue;
            }
            if self.position < range.start() {
                self.position = range.start();
            }

            if self.scanner.is_cancelled() {
                log::info!("Scan cancelled at {}", self.position);
                self.cancelled = true;
                return None;
            }

            if self.reader.is_none() {
                self.reader = Some(ChunkReader::new(
                    self.source,
                    self.scanner.cancel.as_deref(),
                    range.end(),
                    self.scanner.chunk_size,
                ));
            }

            match self.search(range.end()) {
                Step::Found(addr) => {
                    self.position = addr + 1;
                    return Some(addr);
                }
                Step::Truncated(addr) => {
                    log::debug!("Scan of {} truncated at {}", range, addr);
                    self.truncated.push(addr);
                    self.position = range.end();
                    self.next_range();
                }
                Step::Exhausted => {
                    self.position = range.end();
                    self.next_range();
                }
                Step::Cancelled => {
                    log::info!("Scan cancelled in {}", range);
                    self.cancelled = true;
                    return None;
                }
            }
        }
    }
}
