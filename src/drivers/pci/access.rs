//! PCI Configuration Space Access through I/O ports
//!
//! Uses the legacy Configuration Access Mechanism: the configuration address
//! is written to port 0xCF8 and the data is read back from 0xCFC. Running this
//! from user space needs ring-3 I/O privileges, acquired with `iopl(3)`, which
//! in turn requires root or CAP_SYS_RAWIO.

use super::PciConfig;
use crate::error::{Error, Result};

/// PCI configuration space ports (legacy CAM)
const PCI_CONFIG_ADDRESS: u16 = 0xCF8;
const PCI_CONFIG_DATA: u16 = 0xCFC;

/// Reserved bits 30:24 of CONFIG_ADDRESS
const CONFIG_ADDRESS_RESERVED: u32 = 0x7F00_0000;

/// Port I/O based PCI configuration access
///
/// I/O privileges are dropped again when this handle goes away.
#[derive(Debug)]
pub struct PortIo {
    _private: (),
}

impl PortIo {
    /// Acquire I/O privileges for the whole port range
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    pub fn new() -> Result<Self> {
        if unsafe { libc::iopl(3) } != 0 {
            return Err(Error::ResourceAcquisition {
                what: "failed to acquire I/O privileges (needs root or CAP_SYS_RAWIO)",
                source: std::io::Error::last_os_error(),
            });
        }
        log::debug!("Acquired I/O privilege level 3");
        Ok(Self { _private: () })
    }

    #[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
    pub fn new() -> Result<Self> {
        Err(Error::ResourceAcquisition {
            what: "failed to acquire I/O privileges",
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "port I/O is only available on x86_64 Linux",
            ),
        })
    }

    /// Select a register and return the data port for an access of `width` bytes
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    fn select(&self, config_address: u32, width: u16) -> u16 {
        use x86_64::instructions::port::Port;

        let mut address_port: Port<u32> = Port::new(PCI_CONFIG_ADDRESS);
        // SAFETY: I/O privileges were acquired in new()
        unsafe {
            // Do not touch reserved bits
            let reserved = address_port.read() & CONFIG_ADDRESS_RESERVED;
            address_port.write(config_address | reserved);
        }
        // The bridge always transfers a full dword; narrower reads pick
        // their byte lane from the low address bits.
        PCI_CONFIG_DATA + (config_address as u16 & (4 - width))
    }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
impl Drop for PortIo {
    fn drop(&mut self) {
        if unsafe { libc::iopl(0) } != 0 {
            log::warn!(
                "Failed to drop I/O privileges: {}",
                std::io::Error::last_os_error()
            );
        }
    }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
impl PciConfig for PortIo {
    fn read_config_u8(&self, config_address: u32) -> u8 {
        use x86_64::instructions::port::Port;

        let mut data: Port<u8> = Port::new(self.select(config_address, 1));
        unsafe { data.read() }
    }

    fn read_config_u16(&self, config_address: u32) -> u16 {
        use x86_64::instructions::port::Port;

        let mut data: Port<u16> = Port::new(self.select(config_address, 2));
        unsafe { data.read() }
    }

    fn read_config_u32(&self, config_address: u32) -> u32 {
        use x86_64::instructions::port::Port;

        let mut data: Port<u32> = Port::new(self.select(config_address, 4));
        unsafe { data.read() }
    }
}

// A handle can never be constructed here, see PortIo::new()
#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
impl PciConfig for PortIo {
    fn read_config_u8(&self, _config_address: u32) -> u8 {
        0xFF
    }

    fn read_config_u16(&self, _config_address: u32) -> u16 {
        0xFFFF
    }

    fn read_config_u32(&self, _config_address: u32) -> u32 {
        0xFFFF_FFFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_mask_excludes_enable_and_bdf() {
        assert_eq!(CONFIG_ADDRESS_RESERVED & (1 << 31), 0);
        assert_eq!(CONFIG_ADDRESS_RESERVED & 0x00FF_FFFF, 0);
    }
}
