//! Memory-Mapped I/O (MMIO) Register Abstraction
//!
//! This module provides volatile access to hardware MMIO registers using
//! tock-registers, behind the [`Mmio`] trait so that the chipset layer can be
//! exercised against simulated register files.
//!
//! # Example
//!
//! ```rust,ignore
//! use pchflash::drivers::mmio::{Mmio, MmioRegion};
//!
//! let mmio = unsafe { MmioRegion::new(mapped_ptr) };
//! let value = mmio.read32(0x00);  // Read 32-bit register at offset 0
//! mmio.write32(0x04, 0x1234);     // Write 32-bit register at offset 4
//! ```

use core::ptr::NonNull;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, WriteOnly};

/// Offset-addressed register access
///
/// No bounds checking is done at this level. Accesses outside of the backing
/// region behave like the hardware does: undefined.
pub trait Mmio {
    fn read8(&self, offset: u64) -> u8;
    fn read16(&self, offset: u64) -> u16;
    fn read32(&self, offset: u64) -> u32;
    fn read64(&self, offset: u64) -> u64;
    fn write8(&self, offset: u64, value: u8);
    fn write16(&self, offset: u64, value: u16);
    fn write32(&self, offset: u64, value: u32);
    fn write64(&self, offset: u64, value: u64);
}

/// A memory-mapped I/O region in this process' address space.
#[derive(Clone, Copy)]
pub struct MmioRegion {
    /// Virtual base address of the MMIO region
    base: NonNull<u8>,
}

impl MmioRegion {
    /// Create a new MMIO region from a mapped base pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    /// - `base` points to memory mapped for MMIO access
    /// - The mapping outlives this struct and every copy of it
    pub unsafe fn new(base: NonNull<u8>) -> Self {
        Self { base }
    }

    /// Get the virtual base address of this MMIO region.
    #[inline]
    pub fn base(&self) -> u64 {
        self.base.as_ptr() as u64
    }

    #[inline(always)]
    fn at<T>(&self, offset: u64) -> *const T {
        // Unchecked on purpose: offsets come from register tables
        self.base.as_ptr().wrapping_add(offset as usize) as *const T
    }
}

impl Mmio for MmioRegion {
    #[inline]
    fn read8(&self, offset: u64) -> u8 {
        let reg = unsafe { &*self.at::<ReadOnly<u8>>(offset) };
        reg.get()
    }

    #[inline]
    fn read16(&self, offset: u64) -> u16 {
        let reg = unsafe { &*self.at::<ReadOnly<u16>>(offset) };
        reg.get()
    }

    #[inline]
    fn read32(&self, offset: u64) -> u32 {
        let reg = unsafe { &*self.at::<ReadOnly<u32>>(offset) };
        reg.get()
    }

    #[inline]
    fn read64(&self, offset: u64) -> u64 {
        let reg = unsafe { &*self.at::<ReadOnly<u64>>(offset) };
        reg.get()
    }

    #[inline]
    fn write8(&self, offset: u64, value: u8) {
        let reg = unsafe { &*self.at::<WriteOnly<u8>>(offset) };
        reg.set(value);
    }

    #[inline]
    fn write16(&self, offset: u64, value: u16) {
        let reg = unsafe { &*self.at::<WriteOnly<u16>>(offset) };
        reg.set(value);
    }

    #[inline]
    fn write32(&self, offset: u64, value: u32) {
        let reg = unsafe { &*self.at::<WriteOnly<u32>>(offset) };
        reg.set(value);
    }

    #[inline]
    fn write64(&self, offset: u64, value: u64) {
        let reg = unsafe { &*self.at::<WriteOnly<u64>>(offset) };
        reg.set(value);
    }
}

impl core::fmt::Debug for MmioRegion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MmioRegion")
            .field("base", &format_args!("{:#x}", self.base()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_over_plain_memory() {
        let mut backing = [0u64; 4];
        let ptr = NonNull::new(backing.as_mut_ptr() as *mut u8).unwrap();
        let mmio = unsafe { MmioRegion::new(ptr) };

        mmio.write32(0x00, 0x1234_5678);
        mmio.write16(0x08, 0xBEEF);
        mmio.write8(0x0A, 0x42);
        mmio.write64(0x10, 0x0102_0304_0506_0708);

        assert_eq!(mmio.read32(0x00), 0x1234_5678);
        assert_eq!(mmio.read8(0x00), 0x78);
        assert_eq!(mmio.read16(0x08), 0xBEEF);
        assert_eq!(mmio.read32(0x08), 0x0042_BEEF);
        assert_eq!(mmio.read64(0x10), 0x0102_0304_0506_0708);
    }
}
