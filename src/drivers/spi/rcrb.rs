//! Root Complex Register Block
//!
//! The chipset configuration registers (GCS and the SPI BAR block) live in a
//! 16 KiB window whose physical address is programmed in RCBA.

use super::regs::{RCRB_SIZE, Rcba};
use crate::drivers::mmio::Mmio;
use crate::drivers::physmem::PhysicalMemoryMapper;
use crate::error::{Error, Result};

/// Exclusive mapping of the root complex register block
#[derive(Debug)]
pub struct RootComplexWindow<M: Mmio> {
    region: M,
    base: u32,
}

impl<M: Mmio> RootComplexWindow<M> {
    /// Map the window described by `rcba`
    ///
    /// Fails without touching the mapper if RCBA is not enabled.
    pub fn map<P>(mapper: &P, rcba: &Rcba) -> Result<Self>
    where
        P: PhysicalMemoryMapper<Region = M>,
    {
        if !rcba.enable {
            log::error!("RCBA not enabled");
            return Err(Error::InvalidArgument("root complex base address is disabled"));
        }

        let region = mapper.map(rcba.base_address as u64, RCRB_SIZE)?;
        log::info!(
            "Mapped root complex register block at {:#010x}",
            rcba.base_address
        );

        Ok(Self {
            region,
            base: rcba.base_address,
        })
    }

    /// Physical address of the window
    pub fn base(&self) -> u32 {
        self.base
    }

    #[inline]
    pub fn read8(&self, offset: u64) -> u8 {
        self.region.read8(offset)
    }

    #[inline]
    pub fn read16(&self, offset: u64) -> u16 {
        self.region.read16(offset)
    }

    #[inline]
    pub fn read32(&self, offset: u64) -> u32 {
        self.region.read32(offset)
    }

    #[inline]
    pub fn read64(&self, offset: u64) -> u64 {
        self.region.read64(offset)
    }

    #[inline]
    pub fn write8(&self, offset: u64, value: u8) {
        self.region.write8(offset, value)
    }

    #[inline]
    pub fn write16(&self, offset: u64, value: u16) {
        self.region.write16(offset, value)
    }

    #[inline]
    pub fn write32(&self, offset: u64, value: u32) {
        self.region.write32(offset, value)
    }

    #[inline]
    pub fn write64(&self, offset: u64, value: u64) {
        self.region.write64(offset, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::spi::sim::{SimMapper, SimulatedRcrb};

    #[test]
    fn test_map_disabled_rcba_skips_mapper() {
        let mapper = SimMapper::new(SimulatedRcrb::new(0x3800, vec![0; 256]));
        let rcba = Rcba::decode(0xFED1_C000);

        let result = RootComplexWindow::map(&mapper, &rcba);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(mapper.requests().is_empty());
    }

    #[test]
    fn test_map_uses_base_and_window_size() {
        let mapper = SimMapper::new(SimulatedRcrb::new(0x3800, vec![0; 256]));
        let rcba = Rcba::decode(0xFED1_C001);

        let window = RootComplexWindow::map(&mapper, &rcba).unwrap();
        assert_eq!(window.base(), 0xFED1_C000);
        assert_eq!(mapper.requests(), vec![(0xFED1_C000, RCRB_SIZE)]);

        window.write32(0x3410, 0x0000_0C01);
        assert_eq!(window.read32(0x3410), 0x0000_0C01);
        assert_eq!(window.read16(0x3410), 0x0C01);
        assert_eq!(window.read8(0x3411), 0x0C);
    }
}
