//! Hardware Sequencing Flash Reads
//!
//! With a valid flash descriptor the SPI controller runs read cycles on its
//! own: program FADDR and HSFC, set FGO, wait for FDONE and collect up to 64
//! bytes from FDATA. Reads are done block by block; a block the controller
//! refuses (FCERR, usually a protected region) is reported to the caller
//! instead of failing the whole read.

use super::intel_chipsets::RegisterSet;
use super::rcrb::RootComplexWindow;
use super::regs::{FLASH_ADDRESS_SPACE, FlashCycle, HWSEQ_MAX_DATA, Hsfs};
use crate::drivers::mmio::Mmio;
use crate::error::{Error, Result};

/// Smallest hardware sequencing transfer, one FDATA register
pub const MIN_BLOCK_SIZE: u32 = 4;
/// Largest hardware sequencing transfer, the whole FDATA bank
pub const MAX_BLOCK_SIZE: u32 = HWSEQ_MAX_DATA as u32;

/// How long to wait for FDONE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollLimit {
    /// Poll until the controller reports completion
    #[default]
    Unbounded,
    /// Give up with [`Error::Timeout`] after this many HSFS reads
    Iterations(u64),
}

/// Drives block reads through the hardware sequencer
pub struct HwSequencer<'a, M: Mmio> {
    regs: &'a RegisterSet,
    window: &'a RootComplexWindow<M>,
    poll_limit: PollLimit,
}

impl<'a, M: Mmio> HwSequencer<'a, M> {
    pub fn new(regs: &'a RegisterSet, window: &'a RootComplexWindow<M>) -> Self {
        Self {
            regs,
            window,
            poll_limit: PollLimit::Unbounded,
        }
    }

    pub fn with_poll_limit(mut self, poll_limit: PollLimit) -> Self {
        self.poll_limit = poll_limit;
        self
    }

    /// Read `size` bytes from flash address `start` in `block_size` chunks
    ///
    /// `on_block` receives each block's address and data; returning `false`
    /// ends the read early. When a cycle fails, `on_error` decides whether to
    /// go on (`true`) or to end the read (`false`). Without `on_error` failed
    /// blocks are delivered anyway. `on_done` runs only after the last block.
    ///
    /// Ending early is not an error.
    pub fn read<F>(
        &self,
        start: u32,
        size: u32,
        block_size: u32,
        mut on_block: F,
        mut on_error: Option<&mut dyn FnMut(u32) -> bool>,
        on_done: Option<&mut dyn FnMut()>,
    ) -> Result<()>
    where
        F: FnMut(u32, &[u8]) -> bool,
    {
        if !(MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&block_size) {
            return Err(Error::InvalidArgument("block size must be within 4..=64 bytes"));
        }
        if block_size % 4 != 0 {
            return Err(Error::InvalidArgument("block size must be a multiple of 4 bytes"));
        }
        if size % block_size != 0 {
            return Err(Error::InvalidArgument("size must be a multiple of the block size"));
        }
        if start as u64 + size as u64 > FLASH_ADDRESS_SPACE {
            return Err(Error::InvalidArgument("read runs past the 32 MiB flash address space"));
        }

        let regs = self.regs;
        let window = self.window;

        let hsfs = regs.read_hsfs(window);
        log::debug!(
            "HSFS: FLOCKDN={} FDV={} FDOPSS={} SCIP={} AEL={} FCERR={} FDONE={}",
            hsfs.flash_configuration_lockdown as u8,
            hsfs.flash_descriptor_valid as u8,
            hsfs.flash_descriptor_override_pinstrap_status as u8,
            hsfs.spi_cycle_in_progress as u8,
            hsfs.access_error_log as u8,
            hsfs.flash_cycle_error as u8,
            hsfs.flash_cycle_done as u8
        );
        if hsfs.spi_cycle_in_progress {
            log::error!("SPI cycle already in progress");
            return Err(Error::Busy);
        }

        let mut data = [0u8; HWSEQ_MAX_DATA];
        let data = &mut data[..block_size as usize];

        for block in 0..size / block_size {
            let address = start + block * block_size;

            // Clear status from the previous cycle
            let mut hsfs = regs.read_hsfs(window);
            hsfs.access_error_log = false;
            hsfs.flash_cycle_error = false;
            hsfs.flash_cycle_done = false;
            regs.write_hsfs(window, &hsfs);

            let mut faddr = regs.read_faddr(window);
            faddr.flash_linear_address = address;
            regs.write_faddr(window, &faddr);

            let mut hsfc = regs.read_hsfc(window);
            hsfc.flash_data_byte_count = (block_size - 1) as u16;
            hsfc.flash_cycle = FlashCycle::Read;
            hsfc.flash_cycle_go = true;
            regs.write_hsfc(window, &hsfc);

            let hsfs = self.wait_for_cycle(address)?;
            log::trace!("Read cycle at {:#08x} done", address);

            if hsfs.flash_cycle_error {
                log::warn!("Flash cycle error at {:#08x}", address);
                if let Some(on_error) = on_error.as_mut() {
                    if !on_error(address) {
                        return Ok(());
                    }
                }
            }

            for (i, chunk) in data.chunks_exact_mut(4).enumerate() {
                chunk.copy_from_slice(&regs.read_fdata(window, i).to_le_bytes());
            }

            if !on_block(address, data) {
                return Ok(());
            }
        }

        if let Some(on_done) = on_done {
            on_done();
        }
        Ok(())
    }

    /// Poll HSFS until FDONE is set
    fn wait_for_cycle(&self, address: u32) -> Result<Hsfs> {
        let mut polls = 0u64;
        loop {
            let hsfs = self.regs.read_hsfs(self.window);
            if hsfs.flash_cycle_done {
                return Ok(hsfs);
            }

            polls += 1;
            if let PollLimit::Iterations(limit) = self.poll_limit {
                if polls >= limit {
                    log::error!("Hardware sequencing timeout at {:#08x}", address);
                    return Err(Error::Timeout { address, polls });
                }
            }
            core::hint::spin_loop();
        }
    }
}
