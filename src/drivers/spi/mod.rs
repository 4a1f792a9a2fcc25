//! Intel SPI Flash Access
//!
//! Reads the system SPI flash through the chipset's SPI controller using
//! hardware sequencing.
//!
//! # Architecture
//!
//! The SPI registers of ICH8 through 9 Series chipsets live in the root
//! complex register block (RCRB), a 16 KiB window whose physical address is
//! found in the RCBA register of the LPC bridge (00:1f.0). The register
//! layouts differ slightly between generations:
//!
//! - **ICH8**: SPI BAR at RCRB + 0x3020
//! - **ICH9/ICH10**: SPI BAR moved to RCRB + 0x3800
//! - **6/7 Series**: BIOS_CNTL gains SMM_BWP, new Boot BIOS Straps encoding
//! - **8/9 Series**: PCI boot dropped, LP parts use a single strap bit
//!
//! # Usage
//!
//! ```rust,ignore
//! use pchflash::drivers::spi::Chipset;
//!
//! let mut chipset = Chipset::probe(PortIo::new()?, DevMem)?;
//! chipset.map_root_complex(&chipset.read_rcba())?;
//! let hsfs = chipset.read_hsfs();
//! if hsfs.flash_descriptor_valid {
//!     chipset.read_spi(0, size, 64, |addr, data| true, None, None)?;
//! }
//! ```
//!
//! # References
//!
//! - Intel I/O Controller Hub 8/9/10 Family Datasheets
//! - Intel 6/7/8/9 Series Chipset Family PCH Datasheets

pub mod hwseq;
pub mod intel;
pub mod intel_chipsets;
pub mod rcrb;
pub mod regs;
#[cfg(test)]
pub mod sim;

pub use hwseq::PollLimit;
pub use intel::Chipset;
pub use intel_chipsets::{ChipsetFamily, HardwareId, IchChipset};

/// Intel PCI Vendor ID
pub const INTEL_VID: u16 = 0x8086;
