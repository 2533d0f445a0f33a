// Thu Jan 16 2026 - Alex

use crate::memory::{Address, ByteSource, MemoryError, MemoryRange, ViewKind};
use goblin::elf::program_header::PT_LOAD;
use goblin::mach::Mach;
use goblin::Object;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// A file-backed piece of the loaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSegment {
    pub name: String,
    pub vmaddr: u64,
    pub fileoff: u64,
    pub size: u64,
}

impl ImageSegment {
    pub fn range(&self) -> MemoryRange {
        MemoryRange::from_start_size(Address::new(self.vmaddr), self.size)
    }
}

/// An executable (ELF, PE or Mach-O) addressed by virtual address. Only bytes
/// backed by the file are readable; gaps between segments fail to read.
pub struct ImageMemory {
    data: Arc<dyn AsRef<[u8]> + Send + Sync>,
    segments: Vec<ImageSegment>,
}

impl ImageMemory {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let file = File::open(path)?;
        // SAFETY: read-only mapping, see MmapMemory::from_file.
        let mmap = unsafe { Mmap::map(&file) }?;
        Self::from_data(Arc::new(mmap))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, MemoryError> {
        Self::from_data(Arc::new(bytes))
    }

    pub fn from_segments(bytes: Vec<u8>, segments: Vec<ImageSegment>) -> Self {
        let data: Arc<dyn AsRef<[u8]> + Send + Sync> = Arc::new(bytes);
        let segments = Self::normalize(segments, (*data).as_ref().len() as u64);
        Self { data, segments }
    }

    fn from_data(data: Arc<dyn AsRef<[u8]> + Send + Sync>) -> Result<Self, MemoryError> {
        let bytes = (*data).as_ref();
        let segments = parse_segments(bytes)?;
        let segments = Self::normalize(segments, bytes.len() as u64);
        if segments.is_empty() {
            return Err(MemoryError::BinaryParse("image has no file-backed segments".to_string()));
        }
        log::debug!("Loaded image with {} segment(s)", segments.len());
        Ok(Self { data, segments })
    }

    fn normalize(segments: Vec<ImageSegment>, file_len: u64) -> Vec<ImageSegment> {
        let mut segments: Vec<ImageSegment> = segments
            .into_iter()
            .filter_map(|mut segment| {
                let available = file_len.saturating_sub(segment.fileoff);
                segment.size = segment.size.min(available);
                segment.vmaddr.checked_add(segment.size)?;
                (segment.size > 0).then_some(segment)
            })
            .collect();
        segments.sort_by_key(|s| s.vmaddr);
        segments
    }

    pub fn segments(&self) -> &[ImageSegment] {
        &self.segments
    }

    fn segment_for(&self, addr: Address, len: usize) -> Option<&ImageSegment> {
        self.segments
            .iter()
            .find(|segment| segment.range().contains_span(addr, len as u64))
    }
}

impl ByteSource for ImageMemory {
    fn read_bytes(&self, addr: Address, len: usize) -> Result<Vec<u8>, MemoryError> {
        let segment = self
            .segment_for(addr, len)
            .ok_or(MemoryError::OutOfBounds { address: addr, len })?;
        let offset = (segment.fileoff + (addr.as_u64() - segment.vmaddr)) as usize;
        Ok((*self.data).as_ref()[offset..offset + len].to_vec())
    }

    fn regions(&self) -> Vec<MemoryRange> {
        self.segments.iter().map(ImageSegment::range).collect()
    }

    fn view(&self) -> ViewKind {
        ViewKind::Mapped
    }
}

fn parse_segments(bytes: &[u8]) -> Result<Vec<ImageSegment>, MemoryError> {
    let object = Object::parse(bytes)
        .map_err(|e| MemoryError::BinaryParse(format!("Failed to parse binary: {}", e)))?;

    match object {
        Object::Elf(elf) => Ok(elf
            .program_headers
            .iter()
            .filter(|ph| ph.p_type == PT_LOAD)
            .enumerate()
            .map(|(i, ph)| ImageSegment {
                name: format!("LOAD{}", i),
                vmaddr: ph.p_vaddr,
                fileoff: ph.p_offset,
                size: ph.p_filesz.min(ph.p_memsz),
            })
            .collect()),
        Object::PE(pe) => {
            let image_base = pe.image_base as u64;
            Ok(pe
                .sections
                .iter()
                .map(|section| {
                    let raw_size = section.size_of_raw_data as u64;
                    let size = match section.virtual_size {
                        0 => raw_size,
                        virtual_size => raw_size.min(virtual_size as u64),
                    };
                    ImageSegment {
                        name: section.name().unwrap_or("").to_string(),
                        vmaddr: image_base + section.virtual_address as u64,
                        fileoff: section.pointer_to_raw_data as u64,
                        size,
                    }
                })
                .collect())
        }
        Object::Mach(Mach::Binary(macho)) => {
            let mut segments = Vec::new();
            for segment in &macho.segments {
                let segname = std::str::from_utf8(&segment.segname)
                    .unwrap_or("")
                    .trim_end_matches('\0');
                segments.push(ImageSegment {
                    name: segname.to_string(),
                    vmaddr: segment.vmaddr,
                    fileoff: segment.fileoff,
                    size: segment.filesize.min(segment.vmsize),
                });
            }
            Ok(segments)
        }
        Object::Mach(Mach::Fat(_)) => Err(MemoryError::NotSupported(
            "Fat binaries not supported".to_string(),
        )),
        _ => Err(MemoryError::NotSupported(
            "Unrecognized executable format".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_segment_image() -> ImageMemory {
        let mut data = vec![0u8; 0x40];
        data[0x00..0x04].copy_from_slice(&[0x55, 0x48, 0x89, 0xE5]);
        data[0x20..0x24].copy_from_slice(&[0xC3, 0xCC, 0xCC, 0xCC]);
        ImageMemory::from_segments(
            data,
            vec![
                ImageSegment { name: "data".into(), vmaddr: 0x402000, fileoff: 0x20, size: 0x20 },
                ImageSegment { name: "text".into(), vmaddr: 0x401000, fileoff: 0x00, size: 0x20 },
            ],
        )
    }

    #[test]
    fn test_segments_sorted_by_address() {
        let image = two_segment_image();
        let names: Vec<_> = image.segments().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["text", "data"]);
        assert_eq!(image.start(), Some(Address::new(0x401000)));
        assert_eq!(image.end(), Some(Address::new(0x402020)));
    }

    #[test]
    fn test_virtual_address_translation() {
        let image = two_segment_image();
        assert_eq!(image.read_bytes(Address::new(0x401000), 4).unwrap(), vec![0x55, 0x48, 0x89, 0xE5]);
        assert_eq!(image.read_u8(Address::new(0x402000)).unwrap(), 0xC3);
    }

    #[test]
    fn test_gap_is_unreadable() {
        let image = two_segment_image();
        assert!(image.read_u8(Address::new(0x401020)).is_err());
        assert!(image.read_bytes(Address::new(0x40101e), 4).is_err());
    }

    #[test]
    fn test_segment_clipped_to_file() {
        let image = ImageMemory::from_segments(
            vec![0u8; 0x10],
            vec![
                ImageSegment { name: "a".into(), vmaddr: 0x1000, fileoff: 0x8, size: 0x100 },
                ImageSegment { name: "bss".into(), vmaddr: 0x2000, fileoff: 0x10, size: 0x100 },
            ],
        );
        assert_eq!(image.segments().len(), 1);
        assert_eq!(image.segments()[0].size, 0x8);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = ImageMemory::from_bytes(vec![0x13, 0x37, 0x00, 0x01, 0x02]);
        assert!(result.is_err());
    }
}
