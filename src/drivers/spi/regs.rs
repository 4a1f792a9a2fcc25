//! Intel ICH/PCH SPI Controller Register Definitions
//!
//! Register offsets and decoded register views for the chipset generations
//! handled by this crate. The layouts here are those of the ICH8, the oldest
//! supported generation; newer generations override individual decoders in
//! [`super::intel_chipsets`].
//!
//! Abbreviations follow the Intel datasheets, e.g. "Intel 8 Series/C220
//! Series Chipset Family Platform Controller Hub (PCH)" (328904-003).
//!
//! Every register that the read protocol writes back (HSFS, HSFC, FADDR,
//! SSFS, SSFC) keeps its reserved fields, so that `encode(decode(x)) == x`.

use crate::bits::{flag, set, test, value};
use crate::drivers::pci::PciAddress;

// ============================================================================
// PCI Configuration Space (LPC bridge, 00:1f.0)
// ============================================================================

/// BIOS Control register (8 bits)
pub const PCI_REG_BIOS_CNTL: u8 = 0xDC;
/// Root Complex Base Address register (32 bits)
pub const PCI_REG_RCBA: u8 = 0xF0;

/// Configuration address of BIOS_CNTL
pub fn bios_cntl_address() -> u32 {
    PciAddress::LPC_BRIDGE.config_address(PCI_REG_BIOS_CNTL)
}

/// Configuration address of RCBA
pub fn rcba_address() -> u32 {
    PciAddress::LPC_BRIDGE.config_address(PCI_REG_RCBA)
}

// ============================================================================
// Chipset Configuration Space (root complex window)
// ============================================================================

/// Size of the root complex register block
pub const RCRB_SIZE: usize = 0x4000;

/// General Control and Status register (32 bits), absolute window offset
pub const RCRB_REG_GCS: u64 = 0x3410;

/// SPI BAR of the ICH8
pub const SPIBAR_ICH8: u16 = 0x3020;
/// SPI BAR of the ICH9 and later
pub const SPIBAR_ICH9: u16 = 0x3800;

// ============================================================================
// SPI registers, relative to SPI BAR
// ============================================================================

/// BIOS Flash Primary Region (32 bits)
pub const SPI_REG_BFPR: u16 = 0x00;
/// Hardware Sequencing Flash Status (16 bits)
pub const SPI_REG_HSFS: u16 = 0x04;
/// Hardware Sequencing Flash Control (16 bits)
pub const SPI_REG_HSFC: u16 = 0x06;
/// Flash Address (32 bits)
pub const SPI_REG_FADDR: u16 = 0x08;
/// Flash Data 0 (32 bits each, 16 registers)
pub const SPI_REG_FDATA0: u16 = 0x10;
/// Flash Region Access Permissions (32 bits)
pub const SPI_REG_FRAP: u16 = 0x50;
/// Flash Region 0 (32 bits each, 5 regions)
pub const SPI_REG_FREG0: u16 = 0x54;
/// Protected Range 0 (32 bits each, 5 ranges)
pub const SPI_REG_PR0: u16 = 0x74;
/// Software Sequencing Flash Status (8 bits)
pub const SPI_REG_SSFS: u16 = 0x90;
/// Software Sequencing Flash Control (24 bits)
pub const SPI_REG_SSFC: u16 = 0x91;

/// Number of FDATA registers
pub const FDATA_COUNT: usize = 16;
/// Maximum hardware sequencing transfer, one FDATA bank
pub const HWSEQ_MAX_DATA: usize = FDATA_COUNT * 4;
/// Size of the flash linear address space (FADDR.FLA is 25 bits)
pub const FLASH_ADDRESS_SPACE: u64 = 1 << 25;
/// Number of FREG and PR registers
pub const NUM_FLASH_REGIONS: usize = 5;

/// Flash region and protected range granularity
const PAGE_SHIFT: u32 = 12;
/// Low bits set on decoded limits, marking the last byte of the page
const PAGE_LIMIT_BITS: u32 = (1 << PAGE_SHIFT) - 1;

/// Expand a 13-bit page number to a byte address
#[inline]
fn page_base(page: u32) -> u32 {
    set(24, 12, page)
}

/// Expand a 13-bit page number to the address of the last byte of the page
#[inline]
fn page_limit(page: u32) -> u32 {
    page_base(page) | PAGE_LIMIT_BITS
}

// ============================================================================
// BIOS_CNTL
// ============================================================================

/// SPI Read Configuration (BIOS_CNTL.SRC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiReadConfiguration {
    NoPrefetchButCache = 0,
    NoPrefetchNoCache = 1,
    PrefetchAndCache = 2,
    Reserved = 3,
}

impl SpiReadConfiguration {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::NoPrefetchButCache,
            1 => Self::NoPrefetchNoCache,
            2 => Self::PrefetchAndCache,
            _ => Self::Reserved,
        }
    }
}

/// BIOS Control register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiosCntl {
    /// Bits 7:6
    pub reserved: u8,
    /// SMM BIOS Write Protect Disable (SMM_BWP), reserved on ICH8-ICH10
    pub smm_bios_write_protect_disable: bool,
    /// Top Swap Status (TSS)
    pub top_swap_status: bool,
    /// SPI Read Configuration (SRC)
    pub spi_read_configuration: SpiReadConfiguration,
    /// BIOS Lock Enable (BLE)
    pub bios_lock_enable: bool,
    /// BIOS Write Enable (BWE)
    pub bios_write_enable: bool,
}

impl BiosCntl {
    /// ICH8-ICH10 layout, bit 5 is reserved and reported as clear
    pub fn decode(raw: u8) -> Self {
        Self {
            reserved: value(7, 6, raw),
            smm_bios_write_protect_disable: false,
            top_swap_status: test(4, raw),
            spi_read_configuration: SpiReadConfiguration::from_bits(value(3, 2, raw)),
            bios_lock_enable: test(1, raw),
            bios_write_enable: test(0, raw),
        }
    }
}

// ============================================================================
// RCBA
// ============================================================================

/// Root Complex Base Address register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rcba {
    /// Base Address (BA), bits 31:14 unshifted, i.e. the physical address
    pub base_address: u32,
    /// Bits 13:1
    pub reserved: u32,
    /// Enable (EN)
    pub enable: bool,
}

impl Rcba {
    pub fn decode(raw: u32) -> Self {
        Self {
            base_address: crate::bits::raw(31, 14, raw),
            reserved: value(13, 1, raw),
            enable: test(0, raw),
        }
    }
}

// ============================================================================
// GCS
// ============================================================================

/// Boot BIOS Straps (GCS.BBS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootBiosStraps {
    Lpc = 0,
    Reserved = 1,
    Pci = 2,
    Spi = 3,
}

impl core::fmt::Display for BootBiosStraps {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Lpc => write!(f, "LPC"),
            Self::Reserved => write!(f, "Reserved"),
            Self::Pci => write!(f, "PCI"),
            Self::Spi => write!(f, "SPI"),
        }
    }
}

/// General Control and Status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gcs {
    /// Boot BIOS Straps (BBS)
    pub boot_bios_straps: BootBiosStraps,
    /// BIOS Interface Lock-Down (BILD)
    pub bios_interface_lockdown: bool,
}

impl Gcs {
    /// ICH8-ICH10 strap encoding
    pub fn decode(raw: u32, _integrated_io: bool) -> Self {
        const STRAPS: [BootBiosStraps; 4] = [
            BootBiosStraps::Spi,
            BootBiosStraps::Spi,
            BootBiosStraps::Pci,
            BootBiosStraps::Lpc,
        ];
        Self {
            boot_bios_straps: STRAPS[value(11, 10, raw) as usize],
            bios_interface_lockdown: test(0, raw),
        }
    }
}

// ============================================================================
// BFPR
// ============================================================================

/// BIOS Flash Primary Region register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bfpr {
    /// Bits 31:29
    pub reserved31: u8,
    /// Primary Region Limit (PRL), as a byte address
    pub bios_flash_primary_region_limit: u32,
    /// Bits 15:13
    pub reserved15: u8,
    /// Primary Region Base (PRB), as a byte address
    pub bios_flash_primary_region_base: u32,
}

impl Bfpr {
    pub fn decode(raw: u32) -> Self {
        Self {
            reserved31: value(31, 29, raw) as u8,
            bios_flash_primary_region_limit: page_base(value(28, 16, raw)),
            reserved15: value(15, 13, raw) as u8,
            bios_flash_primary_region_base: page_base(value(12, 0, raw)),
        }
    }
}

// ============================================================================
// HSFS
// ============================================================================

/// Block/Sector Erase Size (HSFS.BERASE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSectorEraseSize {
    Bytes256 = 0,
    Kib4 = 1,
    Kib8OrReserved = 2,
    Kib64 = 3,
}

impl BlockSectorEraseSize {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x3 {
            0 => Self::Bytes256,
            1 => Self::Kib4,
            2 => Self::Kib8OrReserved,
            _ => Self::Kib64,
        }
    }
}

/// Hardware Sequencing Flash Status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsfs {
    /// Flash Configuration Lock-Down (FLOCKDN)
    pub flash_configuration_lockdown: bool,
    /// Flash Descriptor Valid (FDV)
    pub flash_descriptor_valid: bool,
    /// Flash Descriptor Override Pin-Strap Status (FDOPSS)
    pub flash_descriptor_override_pinstrap_status: bool,
    /// Bits 12:6
    pub reserved12: u16,
    /// SPI Cycle In Progress (SCIP)
    pub spi_cycle_in_progress: bool,
    /// Block/Sector Erase Size (BERASE)
    pub block_sector_erase_size: BlockSectorEraseSize,
    /// Access Error Log (AEL)
    pub access_error_log: bool,
    /// Flash Cycle Error (FCERR)
    pub flash_cycle_error: bool,
    /// Flash Cycle Done (FDONE)
    pub flash_cycle_done: bool,
}

impl Hsfs {
    pub fn decode(raw: u16) -> Self {
        Self {
            flash_configuration_lockdown: test(15, raw),
            flash_descriptor_valid: test(14, raw),
            flash_descriptor_override_pinstrap_status: test(13, raw),
            reserved12: value(12, 6, raw),
            spi_cycle_in_progress: test(5, raw),
            block_sector_erase_size: BlockSectorEraseSize::from_bits(value(4, 3, raw)),
            access_error_log: test(2, raw),
            flash_cycle_error: test(1, raw),
            flash_cycle_done: test(0, raw),
        }
    }

    pub fn encode(&self) -> u16 {
        flag::<u16>(15, self.flash_configuration_lockdown)
            | flag::<u16>(14, self.flash_descriptor_valid)
            | flag::<u16>(13, self.flash_descriptor_override_pinstrap_status)
            | set(12, 6, self.reserved12)
            | flag::<u16>(5, self.spi_cycle_in_progress)
            | set(4, 3, self.block_sector_erase_size as u16)
            | flag::<u16>(2, self.access_error_log)
            | flag::<u16>(1, self.flash_cycle_error)
            | flag::<u16>(0, self.flash_cycle_done)
    }
}

// ============================================================================
// HSFC
// ============================================================================

/// Flash Cycle (HSFC.FCYCLE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCycle {
    Read = 0,
    Reserved = 1,
    Write = 2,
    BlockErase = 3,
}

impl FlashCycle {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x3 {
            0 => Self::Read,
            1 => Self::Reserved,
            2 => Self::Write,
            _ => Self::BlockErase,
        }
    }
}

/// Hardware Sequencing Flash Control register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsfc {
    /// Flash SPI SMI# Enable (FSMIE)
    pub flash_spi_smi_enable: bool,
    /// Bit 14
    pub reserved14: bool,
    /// Flash Data Byte Count (FDBC), bytes minus one
    pub flash_data_byte_count: u16,
    /// Bits 7:3
    pub reserved7: u16,
    /// Flash Cycle (FCYCLE)
    pub flash_cycle: FlashCycle,
    /// Flash Cycle Go (FGO)
    pub flash_cycle_go: bool,
}

impl Hsfc {
    pub fn decode(raw: u16) -> Self {
        Self {
            flash_spi_smi_enable: test(15, raw),
            reserved14: test(14, raw),
            flash_data_byte_count: value(13, 8, raw),
            reserved7: value(7, 3, raw),
            flash_cycle: FlashCycle::from_bits(value(2, 1, raw)),
            flash_cycle_go: test(0, raw),
        }
    }

    pub fn encode(&self) -> u16 {
        flag::<u16>(15, self.flash_spi_smi_enable)
            | flag::<u16>(14, self.reserved14)
            | set(13, 8, self.flash_data_byte_count)
            | set(7, 3, self.reserved7)
            | set(2, 1, self.flash_cycle as u16)
            | flag::<u16>(0, self.flash_cycle_go)
    }
}

// ============================================================================
// FADDR
// ============================================================================

/// Flash Address register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faddr {
    /// Bits 31:25
    pub reserved25: u32,
    /// Flash Linear Address (FLA)
    pub flash_linear_address: u32,
}

impl Faddr {
    pub fn decode(raw: u32) -> Self {
        Self {
            reserved25: value(31, 25, raw),
            flash_linear_address: value(24, 0, raw),
        }
    }

    pub fn encode(&self) -> u32 {
        set(31, 25, self.reserved25) | set(24, 0, self.flash_linear_address)
    }
}

// ============================================================================
// FRAP
// ============================================================================

/// Flash Regions Access Permissions register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frap {
    /// BIOS Master Write Access Grant (BMWAG)
    pub bios_master_write_access_grant: u8,
    /// BIOS Master Read Access Grant (BMRAG)
    pub bios_master_read_access_grant: u8,
    /// BIOS Region Write Access (BRWA)
    pub bios_region_write_access: u8,
    /// BIOS Region Read Access (BRRA)
    pub bios_region_read_access: u8,
}

impl Frap {
    pub fn decode(raw: u32) -> Self {
        Self {
            bios_master_write_access_grant: value(31, 24, raw) as u8,
            bios_master_read_access_grant: value(23, 16, raw) as u8,
            bios_region_write_access: value(15, 8, raw) as u8,
            bios_region_read_access: value(7, 0, raw) as u8,
        }
    }

    /// The register as it reads from hardware
    pub fn to_raw(&self) -> u32 {
        set(31, 24, self.bios_master_write_access_grant as u32)
            | set(23, 16, self.bios_master_read_access_grant as u32)
            | set(15, 8, self.bios_region_write_access as u32)
            | set(7, 0, self.bios_region_read_access as u32)
    }
}

// ============================================================================
// FREGn
// ============================================================================

/// Flash Region N register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FregN {
    /// Bits 31:29
    pub reserved31: u8,
    /// Region Limit (RL), address of the last byte of the region
    pub region_limit: u32,
    /// Bits 15:13
    pub reserved15: u8,
    /// Region Base (RB), as a byte address
    pub region_base: u32,
}

impl FregN {
    pub fn decode(raw: u32) -> Self {
        Self {
            reserved31: value(31, 29, raw) as u8,
            region_limit: page_limit(value(28, 16, raw)),
            reserved15: value(15, 13, raw) as u8,
            region_base: page_base(value(12, 0, raw)),
        }
    }

    /// Unused regions are programmed with a base above their limit
    pub fn is_enabled(&self) -> bool {
        self.region_base <= self.region_limit
    }
}

// ============================================================================
// PRn
// ============================================================================

/// Protected Range N register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrN {
    /// Write Protection Enable (WPE)
    pub write_protection_enable: bool,
    /// Bits 30:29
    pub reserved30: u8,
    /// Protected Range Limit (PRL), address of the last protected byte
    pub protected_range_limit: u32,
    /// Read Protection Enable (RPE)
    pub read_protection_enable: bool,
    /// Bits 14:13
    pub reserved14: u8,
    /// Protected Range Base (PRB), as a byte address
    pub protected_range_base: u32,
}

impl PrN {
    pub fn decode(raw: u32) -> Self {
        Self {
            write_protection_enable: test(31, raw),
            reserved30: value(30, 29, raw) as u8,
            protected_range_limit: page_limit(value(28, 16, raw)),
            read_protection_enable: test(15, raw),
            reserved14: value(14, 13, raw) as u8,
            protected_range_base: page_base(value(12, 0, raw)),
        }
    }
}

// ============================================================================
// SSFS / SSFC
// ============================================================================

/// Software Sequencing Flash Status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ssfs {
    /// Bits 7:5
    pub reserved7: u8,
    /// Access Error Log (AEL)
    pub access_error_log: bool,
    /// Flash Cycle Error (FCERR)
    pub flash_cycle_error: bool,
    /// Cycle Done Status (CDS)
    pub cycle_done_status: bool,
    /// Bit 1
    pub reserved1: bool,
    /// SPI Cycle In Progress (SCIP)
    pub spi_cycle_in_progress: bool,
}

impl Ssfs {
    pub fn decode(raw: u8) -> Self {
        Self {
            reserved7: value(7, 5, raw),
            access_error_log: test(4, raw),
            flash_cycle_error: test(3, raw),
            cycle_done_status: test(2, raw),
            reserved1: test(1, raw),
            spi_cycle_in_progress: test(0, raw),
        }
    }

    pub fn encode(&self) -> u8 {
        set(7, 5, self.reserved7)
            | flag::<u8>(4, self.access_error_log)
            | flag::<u8>(3, self.flash_cycle_error)
            | flag::<u8>(2, self.cycle_done_status)
            | flag::<u8>(1, self.reserved1)
            | flag::<u8>(0, self.spi_cycle_in_progress)
    }
}

/// SPI Cycle Frequency (SSFC.SCF)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiCycleFrequency {
    Mhz20,
    Mhz33,
    /// Any other encoding, kept for write-back
    Reserved(u8),
}

impl SpiCycleFrequency {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x7 {
            0 => Self::Mhz20,
            1 => Self::Mhz33,
            other => Self::Reserved(other as u8),
        }
    }

    fn bits(self) -> u32 {
        match self {
            Self::Mhz20 => 0,
            Self::Mhz33 => 1,
            Self::Reserved(bits) => bits as u32,
        }
    }
}

/// Software Sequencing Flash Control register (24 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ssfc {
    /// Bits 23:19
    pub reserved23: u8,
    /// SPI Cycle Frequency (SCF)
    pub spi_cycle_frequency: SpiCycleFrequency,
    /// SPI SMI# Enable (SME)
    pub spi_smi_enable: bool,
    /// Data Cycle (DS)
    pub data_cycle: bool,
    /// Data Byte Count (DBC), bytes minus one
    pub data_byte_count: u8,
    /// Bit 7
    pub reserved7: bool,
    /// Cycle Opcode Pointer (COP)
    pub cycle_opcode_pointer: u8,
    /// Sequence Prefix Opcode Pointer (SPOP)
    pub sequence_prefix_opcode_pointer: bool,
    /// Atomic Cycle Sequence (ACS)
    pub atomic_cycle_sequence: bool,
    /// SPI Cycle Go (SCGO)
    pub spi_cycle_go: bool,
    /// Bit 0
    pub reserved0: bool,
}

impl Ssfc {
    /// Decode the low 24 bits of `raw`
    pub fn decode(raw: u32) -> Self {
        Self {
            reserved23: value(23, 19, raw) as u8,
            spi_cycle_frequency: SpiCycleFrequency::from_bits(value(18, 16, raw)),
            spi_smi_enable: test(15, raw),
            data_cycle: test(14, raw),
            data_byte_count: value(13, 8, raw) as u8,
            reserved7: test(7, raw),
            cycle_opcode_pointer: value(6, 4, raw) as u8,
            sequence_prefix_opcode_pointer: test(3, raw),
            atomic_cycle_sequence: test(2, raw),
            spi_cycle_go: test(1, raw),
            reserved0: test(0, raw),
        }
    }

    /// Encode into the low 24 bits
    pub fn encode(&self) -> u32 {
        set(23, 19, self.reserved23 as u32)
            | set(18, 16, self.spi_cycle_frequency.bits())
            | flag::<u32>(15, self.spi_smi_enable)
            | flag::<u32>(14, self.data_cycle)
            | set(13, 8, self.data_byte_count as u32)
            | flag::<u32>(7, self.reserved7)
            | set(6, 4, self.cycle_opcode_pointer as u32)
            | flag::<u32>(3, self.sequence_prefix_opcode_pointer)
            | flag::<u32>(2, self.atomic_cycle_sequence)
            | flag::<u32>(1, self.spi_cycle_go)
            | flag::<u32>(0, self.reserved0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hsfs_roundtrip_all_values() {
        for raw in 0..=u16::MAX {
            assert_eq!(Hsfs::decode(raw).encode(), raw, "HSFS {:#06x}", raw);
        }
    }

    #[test]
    fn test_hsfc_roundtrip_all_values() {
        for raw in 0..=u16::MAX {
            assert_eq!(Hsfc::decode(raw).encode(), raw, "HSFC {:#06x}", raw);
        }
    }

    #[test]
    fn test_ssfs_roundtrip_all_values() {
        for raw in 0..=u8::MAX {
            assert_eq!(Ssfs::decode(raw).encode(), raw);
        }
    }

    proptest! {
        #[test]
        fn faddr_roundtrip(raw in any::<u32>()) {
            prop_assert_eq!(Faddr::decode(raw).encode(), raw);
        }

        #[test]
        fn ssfc_roundtrip(raw in 0u32..(1 << 24)) {
            prop_assert_eq!(Ssfc::decode(raw).encode(), raw);
        }

        #[test]
        fn frap_roundtrip(raw in any::<u32>()) {
            prop_assert_eq!(Frap::decode(raw).to_raw(), raw);
        }
    }

    #[test]
    fn test_hsfs_fields() {
        // FLOCKDN | FDV | SCIP | FCERR | FDONE
        let hsfs = Hsfs::decode(0xC023);
        assert!(hsfs.flash_configuration_lockdown);
        assert!(hsfs.flash_descriptor_valid);
        assert!(!hsfs.flash_descriptor_override_pinstrap_status);
        assert!(hsfs.spi_cycle_in_progress);
        assert!(!hsfs.access_error_log);
        assert!(hsfs.flash_cycle_error);
        assert!(hsfs.flash_cycle_done);
        assert_eq!(hsfs.block_sector_erase_size, BlockSectorEraseSize::Bytes256);
    }

    #[test]
    fn test_hsfc_read_cycle_encoding() {
        let hsfc = Hsfc {
            flash_spi_smi_enable: false,
            reserved14: false,
            flash_data_byte_count: 63,
            reserved7: 0,
            flash_cycle: FlashCycle::Read,
            flash_cycle_go: true,
        };
        assert_eq!(hsfc.encode(), 0x3F01);
    }

    #[test]
    fn test_faddr_keeps_reserved_bits() {
        let mut faddr = Faddr::decode(0xFE00_0000);
        faddr.flash_linear_address = 0x0123_4567;
        // FLA is 25 bits wide
        assert_eq!(faddr.encode(), 0xFE00_0000 | (0x0123_4567 & 0x01FF_FFFF));
    }

    #[test]
    fn test_rcba_decode() {
        let rcba = Rcba::decode(0xFED1_C001);
        assert_eq!(rcba.base_address, 0xFED1_C000);
        assert!(rcba.enable);
        assert!(!Rcba::decode(0xFED1_C000).enable);
    }

    #[test]
    fn test_freg_limit_is_last_byte() {
        // BIOS region from 0x200000 to 0x7FFFFF
        let freg = FregN::decode(0x07FF_0200);
        assert_eq!(freg.region_base, 0x0020_0000);
        assert_eq!(freg.region_limit, 0x007F_FFFF);
        assert!(freg.is_enabled());

        // Unused region: base 0x1FFF, limit 0
        let unused = FregN::decode(0x0000_1FFF);
        assert_eq!(unused.region_base, 0x01FF_F000);
        assert_eq!(unused.region_limit, 0x0000_0FFF);
        assert!(!unused.is_enabled());
    }

    #[test]
    fn test_pr_decode() {
        let pr = PrN::decode(0x87FF_8600);
        assert!(pr.write_protection_enable);
        assert!(pr.read_protection_enable);
        assert_eq!(pr.protected_range_base, 0x0060_0000);
        assert_eq!(pr.protected_range_limit, 0x007F_FFFF);
        assert_eq!(pr.reserved14, 0);
        assert_eq!(pr.reserved30, 0);
    }

    #[test]
    fn test_bfpr_limit_is_page_boundary() {
        let bfpr = Bfpr::decode(0x07FF_0200);
        assert_eq!(bfpr.bios_flash_primary_region_base, 0x0020_0000);
        assert_eq!(bfpr.bios_flash_primary_region_limit, 0x007F_F000);
    }

    #[test]
    fn test_bios_cntl_ich8_ignores_bit5() {
        let cntl = BiosCntl::decode(0x2B);
        assert!(!cntl.smm_bios_write_protect_disable);
        assert!(!cntl.top_swap_status);
        assert_eq!(
            cntl.spi_read_configuration,
            SpiReadConfiguration::PrefetchAndCache
        );
        assert!(cntl.bios_lock_enable);
        assert!(cntl.bios_write_enable);
    }

    #[test]
    fn test_gcs_ich8_straps() {
        let straps = |bbs: u32| Gcs::decode(bbs << 10, false).boot_bios_straps;
        assert_eq!(straps(0), BootBiosStraps::Spi);
        assert_eq!(straps(1), BootBiosStraps::Spi);
        assert_eq!(straps(2), BootBiosStraps::Pci);
        assert_eq!(straps(3), BootBiosStraps::Lpc);
        assert!(Gcs::decode(1, false).bios_interface_lockdown);
    }

    #[test]
    fn test_pci_addresses() {
        assert_eq!(bios_cntl_address(), 0x8000_F8DC);
        assert_eq!(rcba_address(), 0x8000_F8F0);
    }
}
