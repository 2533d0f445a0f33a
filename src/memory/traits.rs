// Wed Jan 15 2026 - Alex

use crate::memory::{Address, MemoryError, MemoryRange};

/// How addresses of a [`ByteSource`] relate to the analysed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Addresses are file offsets; instruction metadata does not apply.
    Raw,
    /// Addresses are virtual addresses of a loaded image.
    Mapped,
}

pub trait ByteSource: Send + Sync {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError>;

    /// Readable ranges in ascending address order.
    fn regions(&self) -> Vec<MemoryRange>;

    fn view(&self) -> ViewKind {
        ViewKind::Mapped
    }

    fn read_u8(&self, addr: Address) -> Result<u8, MemoryError> {
        let bytes = self.read_bytes(addr, 1)?;
        Ok(bytes[0])
    }

    fn start(&self) -> Option<Address> {
        self.regions().first().map(|r| r.start())
    }

    fn end(&self) -> Option<Address> {
        self.regions().last().map(|r| r.end())
    }
}
