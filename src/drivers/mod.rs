//! Hardware access for pchflash
//!
//! This module contains the low-level access paths to the chipset: port I/O
//! to PCI configuration space, physical memory mappings and the SPI
//! controller itself.

pub mod mmio;
pub mod pci;
pub mod physmem;
pub mod spi;
