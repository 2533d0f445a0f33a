// Wed Jan 15 2026 - Alex

use crate::memory::{Address, ByteSource, MemoryError, MemoryRange, ViewKind};
use std::sync::Arc;

/// Owned bytes exposed at a base address.
#[derive(Debug, Clone)]
pub struct BufferMemory {
    data: Arc<Vec<u8>>,
    base_address: Address,
    view: ViewKind,
}

impl BufferMemory {
    /// Bytes that would lie past the top of the address space are unreachable.
    pub fn new(base_address: Address, data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
            base_address,
            view: ViewKind::Mapped,
        }
    }

    /// A buffer whose addresses are file offsets starting at zero.
    pub fn raw(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
            base_address: Address::zero(),
            view: ViewKind::Raw,
        }
    }

    pub fn base_address(&self) -> Address {
        self.base_address
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn range(&self) -> MemoryRange {
        MemoryRange::from_start_size(self.base_address, self.data.len() as u64)
    }
}

impl ByteSource for BufferMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        if !self.range().contains_span(addr, len as u64) {
            return Err(MemoryError::OutOfBounds { address: addr, len });
        }
        let offset = (addr - self.base_address) as usize;
        Ok(self.data[offset..offset + len].to_vec())
    }

    fn regions(&self) -> Vec<MemoryRange> {
        if self.data.is_empty() {
            Vec::new()
        } else {
            vec![self.range()]
        }
    }

    fn view(&self) -> ViewKind {
        self.view
    }
}
