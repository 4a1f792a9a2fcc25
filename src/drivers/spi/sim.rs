//! Simulated chipset for unit tests
//!
//! [`SimulatedRcrb`] is a 16 KiB register file that behaves like the hardware
//! sequencer: setting HSFC.FGO runs the cycle immediately, fills FDATA from a
//! backing flash image and raises FDONE (plus FCERR for addresses marked as
//! protected).

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::regs::*;
use crate::bits::{set, test, value};
use crate::drivers::mmio::Mmio;
use crate::drivers::pci::{PciAddress, PciConfig, REG_DEVICE_ID, REG_REVISION_ID, REG_VENDOR_ID};
use crate::drivers::physmem::PhysicalMemoryMapper;
use crate::error::{Error, Result};

/// A register write as seen by the simulated hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub offset: u64,
    pub width: u8,
    pub value: u64,
}

#[derive(Debug)]
struct State {
    mem: Vec<u8>,
    flash: Vec<u8>,
    error_addresses: HashSet<u32>,
    stuck: bool,
    cycles: usize,
    writes: Vec<Access>,
}

/// Simulated root complex register block
#[derive(Debug, Clone)]
pub struct SimulatedRcrb {
    spi_bar: u16,
    state: Rc<RefCell<State>>,
}

impl SimulatedRcrb {
    pub fn new(spi_bar: u16, flash: Vec<u8>) -> Self {
        Self {
            spi_bar,
            state: Rc::new(RefCell::new(State {
                mem: vec![0; RCRB_SIZE],
                flash,
                error_addresses: HashSet::new(),
                stuck: false,
                cycles: 0,
                writes: Vec::new(),
            })),
        }
    }

    /// Fail cycles starting at `address` with FCERR
    pub fn inject_error(&self, address: u32) {
        self.state.borrow_mut().error_addresses.insert(address);
    }

    /// Never complete cycles
    pub fn set_stuck(&self, stuck: bool) {
        self.state.borrow_mut().stuck = stuck;
    }

    /// Number of cycles started with FGO
    pub fn cycles(&self) -> usize {
        self.state.borrow().cycles
    }

    /// All writes so far, in order
    pub fn writes(&self) -> Vec<Access> {
        self.state.borrow().writes.clone()
    }

    pub fn spi16(&self, reg: u16) -> u16 {
        self.load(self.spi(reg), 2) as u16
    }

    pub fn spi32(&self, reg: u16) -> u32 {
        self.load(self.spi(reg), 4) as u32
    }

    /// Preset a SPI register without running the cycle logic
    pub fn set_spi8(&self, reg: u16, value: u8) {
        self.store(self.spi(reg), 1, value as u64);
    }

    pub fn set_spi16(&self, reg: u16, value: u16) {
        self.store(self.spi(reg), 2, value as u64);
    }

    pub fn set_spi32(&self, reg: u16, value: u32) {
        self.store(self.spi(reg), 4, value as u64);
    }

    /// Preset a register at an absolute window offset
    pub fn set32(&self, offset: u64, value: u32) {
        self.store(offset, 4, value as u64);
    }

    fn spi(&self, reg: u16) -> u64 {
        self.spi_bar as u64 + reg as u64
    }

    fn load(&self, offset: u64, width: usize) -> u64 {
        let state = self.state.borrow();
        let start = offset as usize;
        state.mem[start..start + width]
            .iter()
            .rev()
            .fold(0u64, |acc, b| acc << 8 | *b as u64)
    }

    fn store(&self, offset: u64, width: usize, value: u64) {
        let mut state = self.state.borrow_mut();
        let start = offset as usize;
        state.mem[start..start + width].copy_from_slice(&value.to_le_bytes()[..width]);
    }

    fn write(&self, offset: u64, width: usize, value: u64) {
        self.state.borrow_mut().writes.push(Access {
            offset,
            width: width as u8,
            value,
        });
        self.store(offset, width, value);

        let hsfc = self.spi(SPI_REG_HSFC);
        if offset <= hsfc && hsfc < offset + width as u64 && test(0, self.spi16(SPI_REG_HSFC)) {
            self.run_cycle();
        }
    }

    fn run_cycle(&self) {
        let hsfc = self.spi16(SPI_REG_HSFC);
        let address = value(24, 0, self.spi32(SPI_REG_FADDR));
        let len = value(13, 8, hsfc) as usize + 1;

        let (stuck, failed, data) = {
            let mut state = self.state.borrow_mut();
            state.cycles += 1;
            let data: Vec<u8> = (0..len)
                .map(|i| {
                    state
                        .flash
                        .get(address as usize + i)
                        .copied()
                        .unwrap_or(0xFF)
                })
                .collect();
            (state.stuck, state.error_addresses.contains(&address), data)
        };
        if stuck {
            return;
        }

        for (i, chunk) in data.chunks(4).enumerate() {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.set_spi32(SPI_REG_FDATA0 + 4 * i as u16, u32::from_le_bytes(word));
        }

        let hsfs = self.spi16(SPI_REG_HSFS) | set(0, 0, 1u16) | set(1, 1, failed as u16);
        self.set_spi16(SPI_REG_HSFS, hsfs);
        self.set_spi16(SPI_REG_HSFC, hsfc & !1);
    }
}

impl Mmio for SimulatedRcrb {
    fn read8(&self, offset: u64) -> u8 {
        self.load(offset, 1) as u8
    }

    fn read16(&self, offset: u64) -> u16 {
        self.load(offset, 2) as u16
    }

    fn read32(&self, offset: u64) -> u32 {
        self.load(offset, 4) as u32
    }

    fn read64(&self, offset: u64) -> u64 {
        self.load(offset, 8)
    }

    fn write8(&self, offset: u64, value: u8) {
        self.write(offset, 1, value as u64)
    }

    fn write16(&self, offset: u64, value: u16) {
        self.write(offset, 2, value as u64)
    }

    fn write32(&self, offset: u64, value: u32) {
        self.write(offset, 4, value as u64)
    }

    fn write64(&self, offset: u64, value: u64) {
        self.write(offset, 8, value)
    }
}

/// Hands out clones of one simulated register block and records requests
#[derive(Debug)]
pub struct SimMapper {
    region: SimulatedRcrb,
    fail: bool,
    requests: RefCell<Vec<(u64, usize)>>,
}

impl SimMapper {
    pub fn new(region: SimulatedRcrb) -> Self {
        Self {
            region,
            fail: false,
            requests: RefCell::new(Vec::new()),
        }
    }

    /// A mapper that refuses every request, like a locked down `/dev/mem`
    pub fn failing(region: SimulatedRcrb) -> Self {
        Self {
            fail: true,
            ..Self::new(region)
        }
    }

    pub fn requests(&self) -> Vec<(u64, usize)> {
        self.requests.borrow().clone()
    }
}

impl PhysicalMemoryMapper for SimMapper {
    type Region = SimulatedRcrb;

    fn map(&self, physical_offset: u64, length: usize) -> Result<SimulatedRcrb> {
        self.requests.borrow_mut().push((physical_offset, length));
        if self.fail {
            return Err(Error::ResourceAcquisition {
                what: "failed to map physical memory",
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        Ok(self.region.clone())
    }
}

/// Configuration space of a single LPC bridge, dword granular
#[derive(Debug, Default)]
pub struct SimulatedPci {
    dwords: HashMap<u32, u32>,
}

impl SimulatedPci {
    pub fn lpc_bridge(vendor: u16, device: u16, revision: u8) -> Self {
        let mut pci = Self::default();
        pci.set_u16(REG_VENDOR_ID, vendor);
        pci.set_u16(REG_DEVICE_ID, device);
        pci.set_u8(REG_REVISION_ID, revision);
        pci
    }

    pub fn set_u32(&mut self, offset: u8, value: u32) {
        self.dwords
            .insert(PciAddress::LPC_BRIDGE.config_address(offset & !3), value);
    }

    pub fn set_u16(&mut self, offset: u8, value: u16) {
        self.merge(offset, 0xFFFF, value as u32);
    }

    pub fn set_u8(&mut self, offset: u8, value: u8) {
        self.merge(offset, 0xFF, value as u32);
    }

    fn merge(&mut self, offset: u8, mask: u32, value: u32) {
        let shift = (offset & 3) as u32 * 8;
        let key = PciAddress::LPC_BRIDGE.config_address(offset & !3);
        let dword = self.dwords.entry(key).or_insert(0);
        *dword = (*dword & !(mask << shift)) | (value & mask) << shift;
    }

    fn lane(&self, config_address: u32) -> u32 {
        let dword = self
            .dwords
            .get(&(config_address & !3))
            .copied()
            .unwrap_or(0xFFFF_FFFF);
        dword >> ((config_address & 3) * 8)
    }
}

impl PciConfig for SimulatedPci {
    fn read_config_u8(&self, config_address: u32) -> u8 {
        self.lane(config_address) as u8
    }

    fn read_config_u16(&self, config_address: u32) -> u16 {
        self.lane(config_address) as u16
    }

    fn read_config_u32(&self, config_address: u32) -> u32 {
        self.lane(config_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_fills_fdata() {
        let flash: Vec<u8> = (0..=255).collect();
        let rcrb = SimulatedRcrb::new(SPIBAR_ICH9, flash);

        rcrb.set_spi32(SPI_REG_FADDR, 0x10);
        // 8 bytes, read, go
        rcrb.write16(SPIBAR_ICH9 as u64 + SPI_REG_HSFC as u64, 0x0701);

        assert_eq!(rcrb.cycles(), 1);
        assert_eq!(rcrb.spi32(SPI_REG_FDATA0), 0x1312_1110);
        assert_eq!(rcrb.spi32(SPI_REG_FDATA0 + 4), 0x1716_1514);
        assert_eq!(rcrb.spi16(SPI_REG_HSFS) & 0x3, 0x1);
        assert_eq!(rcrb.spi16(SPI_REG_HSFC) & 1, 0);
    }

    #[test]
    fn test_pci_lanes() {
        let pci = SimulatedPci::lpc_bridge(0x8086, 0x1C44, 0x05);
        let base = PciAddress::LPC_BRIDGE.config_address(0);
        assert_eq!(pci.read_config_u16(base), 0x8086);
        assert_eq!(pci.read_config_u16(base + 2), 0x1C44);
        assert_eq!(pci.read_config_u32(base), 0x1C44_8086);
        assert_eq!(pci.read_config_u8(base + 8), 0x05);
    }
}
