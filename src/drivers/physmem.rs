//! Physical Memory Mapping
//!
//! Maps a window of physical address space into the process through
//! `/dev/mem`. This requires root (or CAP_SYS_RAWIO) and a kernel that does
//! not restrict `/dev/mem` to low memory (`CONFIG_IO_STRICT_DEVMEM`, or boot
//! with `iomem=relaxed`).

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::ptr::NonNull;

use super::mmio::{Mmio, MmioRegion};
use crate::error::{Error, Result};

/// Something that can map physical memory for register access
pub trait PhysicalMemoryMapper {
    /// Mapped region type
    type Region: Mmio;

    /// Map `length` bytes of physical memory starting at `physical_offset`
    fn map(&self, physical_offset: u64, length: usize) -> Result<Self::Region>;
}

/// Maps physical memory through `/dev/mem`
#[derive(Debug, Default, Clone, Copy)]
pub struct DevMem;

impl PhysicalMemoryMapper for DevMem {
    type Region = PhysicalMemory;

    fn map(&self, physical_offset: u64, length: usize) -> Result<PhysicalMemory> {
        PhysicalMemory::new(physical_offset, length)
    }
}

/// A mapping of physical memory, released on drop
#[derive(Debug)]
pub struct PhysicalMemory {
    /// Keeps `/dev/mem` open for the lifetime of the mapping
    _file: File,
    /// Start of the page-aligned mapping
    mapping: NonNull<libc::c_void>,
    /// Length of the page-aligned mapping
    mapping_len: usize,
    /// Register view starting at the requested physical offset
    region: MmioRegion,
}

impl PhysicalMemory {
    /// Map `length` bytes of physical memory at `physical_offset`
    pub fn new(physical_offset: u64, length: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open("/dev/mem")
            .map_err(|source| Error::ResourceAcquisition {
                what: "failed to open physical memory (are you root?)",
                source,
            })?;

        let page_size = page_size();
        let page_offset = (physical_offset % page_size) as usize;
        let aligned = physical_offset - page_offset as u64;
        let mapping_len = length + page_offset;

        let mem = unsafe {
            libc::mmap(
                core::ptr::null_mut(),
                mapping_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned as libc::off_t,
            )
        };
        if mem == libc::MAP_FAILED {
            return Err(Error::ResourceAcquisition {
                what: "failed to map physical memory",
                source: std::io::Error::last_os_error(),
            });
        }
        let Some(mapping) = NonNull::new(mem) else {
            return Err(Error::ResourceAcquisition {
                what: "failed to map physical memory",
                source: std::io::Error::other("mmap returned a null mapping"),
            });
        };

        // SAFETY: the mapping stays alive until drop, and the region never
        // escapes this struct by value without borrowing it.
        let region = unsafe {
            MmioRegion::new(NonNull::new_unchecked(
                (mapping.as_ptr() as *mut u8).add(page_offset),
            ))
        };

        log::debug!(
            "Mapped {:#x} bytes of physical memory at {:#x} to {:#x}",
            length,
            physical_offset,
            region.base()
        );

        Ok(Self {
            _file: file,
            mapping,
            mapping_len,
            region,
        })
    }
}

fn page_size() -> u64 {
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        size if size > 0 => size as u64,
        _ => 4096,
    }
}

impl Drop for PhysicalMemory {
    fn drop(&mut self) {
        // The file descriptor is closed when `_file` drops after this
        let rc = unsafe { libc::munmap(self.mapping.as_ptr(), self.mapping_len) };
        if rc != 0 {
            log::warn!(
                "munmap failed: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}

impl Mmio for PhysicalMemory {
    #[inline]
    fn read8(&self, offset: u64) -> u8 {
        self.region.read8(offset)
    }

    #[inline]
    fn read16(&self, offset: u64) -> u16 {
        self.region.read16(offset)
    }

    #[inline]
    fn read32(&self, offset: u64) -> u32 {
        self.region.read32(offset)
    }

    #[inline]
    fn read64(&self, offset: u64) -> u64 {
        self.region.read64(offset)
    }

    #[inline]
    fn write8(&self, offset: u64, value: u8) {
        self.region.write8(offset, value)
    }

    #[inline]
    fn write16(&self, offset: u64, value: u16) {
        self.region.write16(offset, value)
    }

    #[inline]
    fn write32(&self, offset: u64, value: u32) {
        self.region.write32(offset, value)
    }

    #[inline]
    fn write64(&self, offset: u64, value: u64) {
        self.region.write64(offset, value)
    }
}
