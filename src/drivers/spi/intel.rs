//! Intel ICH/PCH Chipset Access
//!
//! [`Chipset`] ties together everything needed to read the SPI flash of a
//! supported chipset: PCI configuration access to the LPC bridge, the
//! resolved register layout of its generation and the mapping of the root
//! complex register block.
//!
//! # Example
//!
//! ```rust,ignore
//! use pchflash::drivers::physmem::DevMem;
//! use pchflash::drivers::pci::PortIo;
//! use pchflash::drivers::spi::Chipset;
//!
//! let mut chipset = Chipset::probe(PortIo::new()?, DevMem)?;
//! let rcba = chipset.read_rcba();
//! chipset.map_root_complex(&rcba)?;
//! chipset.read_spi(0, 0x100_0000, 64, |addr, data| { /* ... */ true }, None, None)?;
//! ```

use super::hwseq::{HwSequencer, PollLimit};
use super::intel_chipsets::{self, ChipsetFamily, HardwareId, RegisterSet};
use super::rcrb::RootComplexWindow;
use super::regs::*;
use crate::drivers::pci::{PciAddress, PciConfig, PortIo, REG_DEVICE_ID, REG_REVISION_ID, REG_VENDOR_ID};
use crate::drivers::physmem::{DevMem, PhysicalMemoryMapper};
use crate::error::Result;

/// Read the identity of the LPC bridge
pub fn probe_hardware_id<P: PciConfig>(pci: &P) -> HardwareId {
    let lpc = PciAddress::LPC_BRIDGE;
    HardwareId {
        vendor: pci.read_config_u16(lpc.config_address(REG_VENDOR_ID)),
        device: pci.read_config_u16(lpc.config_address(REG_DEVICE_ID)),
        revision: pci.read_config_u8(lpc.config_address(REG_REVISION_ID)),
    }
}

/// A detected Intel chipset
pub struct Chipset<P: PciConfig = PortIo, M: PhysicalMemoryMapper = DevMem> {
    family: &'static ChipsetFamily,
    registers: RegisterSet,
    hardware_id: HardwareId,
    pci: P,
    mapper: M,
    window: Option<RootComplexWindow<M::Region>>,
    poll_limit: PollLimit,
}

impl<P: PciConfig, M: PhysicalMemoryMapper> Chipset<P, M> {
    /// Detect the chipset behind `pci`
    ///
    /// Fails with [`Error::Unsupported`](crate::Error::Unsupported), carrying
    /// the probed id, if the LPC bridge is not a known Intel chipset.
    pub fn probe(pci: P, mapper: M) -> Result<Self> {
        let hardware_id = probe_hardware_id(&pci);
        log::debug!("LPC bridge at {}: {}", PciAddress::LPC_BRIDGE, hardware_id);

        let family = intel_chipsets::resolve(&hardware_id)?;
        log::info!(
            "Found {} ({}) at {}",
            family,
            family.device_name(hardware_id.device).unwrap_or("unknown"),
            PciAddress::LPC_BRIDGE
        );

        Ok(Self {
            family,
            registers: family.registers(),
            hardware_id,
            pci,
            mapper,
            window: None,
            poll_limit: PollLimit::Unbounded,
        })
    }

    pub fn hardware_id(&self) -> HardwareId {
        self.hardware_id
    }

    pub fn family(&self) -> &'static ChipsetFamily {
        self.family
    }

    pub fn registers(&self) -> &RegisterSet {
        &self.registers
    }

    /// Whether this is a processor-integrated (LP) variant
    pub fn is_integrated_io(&self) -> bool {
        self.family.is_integrated_io(self.hardware_id.device)
    }

    /// Cap the number of status polls per flash cycle
    pub fn set_poll_limit(&mut self, poll_limit: PollLimit) {
        self.poll_limit = poll_limit;
    }

    pub fn read_bios_cntl(&self) -> BiosCntl {
        let raw = self.pci.read_config_u8(bios_cntl_address());
        log::debug!("BIOS_CNTL: {:#04x}", raw);
        (self.registers.bios_cntl)(raw)
    }

    pub fn read_rcba(&self) -> Rcba {
        let raw = self.pci.read_config_u32(rcba_address());
        log::debug!("RCBA: {:#010x}", raw);
        (self.registers.rcba)(raw)
    }

    /// Map the root complex register block, replacing any previous mapping
    pub fn map_root_complex(&mut self, rcba: &Rcba) -> Result<()> {
        self.window = None;
        self.window = Some(RootComplexWindow::map(&self.mapper, rcba)?);
        Ok(())
    }

    pub fn unmap_root_complex(&mut self) {
        self.window = None;
    }

    pub fn is_mapped(&self) -> bool {
        self.window.is_some()
    }

    /// The mapped root complex register block
    ///
    /// # Panics
    ///
    /// If [`Chipset::map_root_complex`] was not called.
    pub fn window(&self) -> &RootComplexWindow<M::Region> {
        match &self.window {
            Some(window) => window,
            None => panic!("root complex not mapped, call map_root_complex() first"),
        }
    }

    pub fn read_gcs(&self) -> Gcs {
        self.registers.read_gcs(self.window(), self.is_integrated_io())
    }

    pub fn read_bfpr(&self) -> Bfpr {
        self.registers.read_bfpr(self.window())
    }

    pub fn read_hsfs(&self) -> Hsfs {
        self.registers.read_hsfs(self.window())
    }

    pub fn write_hsfs(&self, hsfs: &Hsfs) {
        self.registers.write_hsfs(self.window(), hsfs)
    }

    pub fn read_hsfc(&self) -> Hsfc {
        self.registers.read_hsfc(self.window())
    }

    pub fn write_hsfc(&self, hsfc: &Hsfc) {
        self.registers.write_hsfc(self.window(), hsfc)
    }

    pub fn read_faddr(&self) -> Faddr {
        self.registers.read_faddr(self.window())
    }

    pub fn write_faddr(&self, faddr: &Faddr) {
        self.registers.write_faddr(self.window(), faddr)
    }

    pub fn read_fdata(&self, index: usize) -> u32 {
        self.registers.read_fdata(self.window(), index)
    }

    pub fn read_frap(&self) -> Frap {
        self.registers.read_frap(self.window())
    }

    pub fn read_freg(&self, index: usize) -> FregN {
        self.registers.read_freg(self.window(), index)
    }

    pub fn read_pr(&self, index: usize) -> PrN {
        self.registers.read_pr(self.window(), index)
    }

    pub fn read_ssfs(&self) -> Ssfs {
        self.registers.read_ssfs(self.window())
    }

    pub fn write_ssfs(&self, ssfs: &Ssfs) {
        self.registers.write_ssfs(self.window(), ssfs)
    }

    pub fn read_ssfc(&self) -> Ssfc {
        self.registers.read_ssfc(self.window())
    }

    pub fn write_ssfc(&self, ssfc: &Ssfc) {
        self.registers.write_ssfc(self.window(), ssfc)
    }

    /// Read flash contents through hardware sequencing
    ///
    /// See [`HwSequencer::read`] for the callback contract.
    pub fn read_spi<F>(
        &self,
        start: u32,
        size: u32,
        block_size: u32,
        on_block: F,
        on_error: Option<&mut dyn FnMut(u32) -> bool>,
        on_done: Option<&mut dyn FnMut()>,
    ) -> Result<()>
    where
        F: FnMut(u32, &[u8]) -> bool,
    {
        HwSequencer::new(&self.registers, self.window())
            .with_poll_limit(self.poll_limit)
            .read(start, size, block_size, on_block, on_error, on_done)
    }
}
