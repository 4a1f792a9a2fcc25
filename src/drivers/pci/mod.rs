//! PCI configuration space addressing
//!
//! The chipset registers we need (vendor/device id, BIOS_CNTL and RCBA) live
//! in the configuration space of the LPC bridge at 00:1f.0. They are accessed
//! through the legacy configuration mechanism, see [`access`].

pub mod access;

pub use access::PortIo;

use crate::bits;

/// Vendor ID register offset (16 bits)
pub const REG_VENDOR_ID: u8 = 0x00;
/// Device ID register offset (16 bits)
pub const REG_DEVICE_ID: u8 = 0x02;
/// Revision ID register offset (8 bits)
pub const REG_REVISION_ID: u8 = 0x08;

/// PCI device location (Bus:Device.Function)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    /// The LPC (ISA) bridge of Intel ICH/PCH chipsets
    pub const LPC_BRIDGE: Self = Self::new(0x00, 31, 0);

    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }

    /// Build a configuration address for a register of this function
    ///
    /// Layout per PCI Local Bus Specification 3.0, section 3.2.2.3.2: bit 31
    /// enables the transaction, then bus (23:16), device (15:11), function
    /// (10:8) and register (7:0). The low two register bits are kept, they
    /// select the byte lane for 8 and 16-bit accesses.
    pub fn config_address(&self, offset: u8) -> u32 {
        bits::flag::<u32>(31, true)
            | bits::set(23, 16, self.bus as u32)
            | bits::set(15, 11, self.device as u32)
            | bits::set(10, 8, self.function as u32)
            | bits::set(7, 0, offset as u32)
    }
}

impl core::fmt::Display for PciAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// Read access to PCI configuration space
pub trait PciConfig {
    fn read_config_u8(&self, config_address: u32) -> u8;
    fn read_config_u16(&self, config_address: u32) -> u16;
    fn read_config_u32(&self, config_address: u32) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_address_layout() {
        assert_eq!(PciAddress::LPC_BRIDGE.config_address(0x00), 0x8000_F800);
        assert_eq!(PciAddress::LPC_BRIDGE.config_address(0xF0), 0x8000_F8F0);
        assert_eq!(PciAddress::LPC_BRIDGE.config_address(0xDC), 0x8000_F8DC);
        assert_eq!(PciAddress::new(0x12, 3, 7).config_address(0x02), 0x8012_1F02);
    }

    #[test]
    fn test_display() {
        assert_eq!(PciAddress::LPC_BRIDGE.to_string(), "00:1f.0");
    }
}
