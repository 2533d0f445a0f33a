// Tue Jan 13 2026 - Alex

pub mod address;
pub mod buffer;
pub mod error;
pub mod image;
pub mod mmap;
pub mod range;
pub mod traits;

pub use address::Address;
pub use buffer::BufferMemory;
pub use error::MemoryError;
pub use image::{ImageMemory, ImageSegment};
pub use mmap::MmapMemory;
pub use range::MemoryRange;
pub use traits::{ByteSource, ViewKind};
