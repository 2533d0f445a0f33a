// Tue Jan 13 2026 - Alex

use crate::memory::{Address, ByteSource, MemoryError, MemoryRange, ViewKind};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// A file mapped verbatim; addresses are file offsets shifted by `base_address`.
pub struct MmapMemory {
    mmap: Arc<Mmap>,
    base_address: Address,
}

impl MmapMemory {
    pub fn from_file<P: AsRef<Path>>(path: P, base_address: Address) -> Result<Self, MemoryError> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only; concurrent truncation of the file by
        // another process is outside what this tool guards against.
        let mmap = unsafe { Mmap::map(&file) }?;
        if base_address.checked_add(mmap.len() as u64).is_none() {
            return Err(MemoryError::OutOfBounds {
                address: base_address,
                len: mmap.len(),
            });
        }
        Ok(Self {
            mmap: Arc::new(mmap),
            base_address,
        })
    }

    pub fn base_address(&self) -> Address {
        self.base_address
    }

    pub fn size(&self) -> usize {
        self.mmap.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_ref()
    }

    fn range(&self) -> MemoryRange {
        MemoryRange::from_start_size(self.base_address, self.mmap.len() as u64)
    }
}

impl ByteSource for MmapMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        if !self.range().contains_span(addr, len as u64) {
            return Err(MemoryError::OutOfBounds { address: addr, len });
        }
        let offset = (addr - self.base_address) as usize;
        Ok(self.mmap[offset..offset + len].to_vec())
    }

    fn regions(&self) -> Vec<MemoryRange> {
        if self.mmap.is_empty() {
            Vec::new()
        } else {
            vec![self.range()]
        }
    }

    fn view(&self) -> ViewKind {
        ViewKind::Raw
    }
}
