//! Intel Chipset Families
//!
//! This module contains the PCI device IDs of the supported Intel chipsets
//! and the register layout differences between their generations.
//!
//! Each generation is a static [`ChipsetFamily`] that names its parent and
//! only lists the registers whose layout changed. [`ChipsetFamily::registers`]
//! walks the chain and yields a complete [`RegisterSet`].

use super::INTEL_VID;
use super::rcrb::RootComplexWindow;
use super::regs::*;
use crate::bits::{test, value};
use crate::drivers::mmio::Mmio;
use crate::error::{Error, Result};

/// Identity of the LPC bridge as read from PCI configuration space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareId {
    pub vendor: u16,
    pub device: u16,
    pub revision: u8,
}

impl core::fmt::Display for HardwareId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "VID: 0x{:04X}  DID: 0x{:04X}  RID: 0x{:02X}",
            self.vendor, self.device, self.revision
        )
    }
}

/// Intel chipset generation
///
/// The ordering is significant: later generations inherit the register
/// layout of the earlier ones unless overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum IchChipset {
    /// ICH8 (first hardware sequencing engine)
    Ich8,
    /// ICH9
    Ich9,
    /// ICH10
    Ich10,
    /// 6 Series (Cougar Point)
    Series6CougarPoint,
    /// 7 Series (Panther Point)
    Series7PantherPoint,
    /// 8 Series (Lynx Point)
    Series8LynxPoint,
    /// 9 Series (Wildcat Point)
    Series9WildcatPoint,
}

impl core::fmt::Display for IchChipset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ich8 => write!(f, "ICH8"),
            Self::Ich9 => write!(f, "ICH9"),
            Self::Ich10 => write!(f, "ICH10"),
            Self::Series6CougarPoint => write!(f, "6 Series (Cougar Point)"),
            Self::Series7PantherPoint => write!(f, "7 Series (Panther Point)"),
            Self::Series8LynxPoint => write!(f, "8 Series (Lynx Point)"),
            Self::Series9WildcatPoint => write!(f, "9 Series (Wildcat Point)"),
        }
    }
}

/// A device entry in a family's PCI ID table
#[derive(Debug, Clone, Copy)]
pub struct DeviceId {
    /// PCI device ID of the LPC bridge
    pub id: u16,
    /// Marketing name
    pub name: &'static str,
}

impl DeviceId {
    const fn new(id: u16, name: &'static str) -> Self {
        Self { id, name }
    }
}

/// Register decoders that a generation changes relative to its parent
///
/// `None` inherits from the parent.
#[derive(Debug, Clone, Copy)]
pub struct RegisterOverrides {
    pub spi_bar: Option<u16>,
    pub bios_cntl: Option<fn(u8) -> BiosCntl>,
    pub gcs: Option<fn(u32, bool) -> Gcs>,
}

impl RegisterOverrides {
    /// Inherit everything
    pub const NONE: Self = Self {
        spi_bar: None,
        bios_cntl: None,
        gcs: None,
    };
}

/// A chipset generation
#[derive(Debug)]
pub struct ChipsetFamily {
    pub generation: IchChipset,
    pub name: &'static str,
    /// The generation this one is derived from
    pub parent: Option<&'static ChipsetFamily>,
    /// Device IDs belonging to this generation
    pub devices: &'static [DeviceId],
    /// Device IDs of processor-integrated (LP) variants, a subset of `devices`
    pub integrated_io: &'static [u16],
    pub overrides: RegisterOverrides,
}

impl ChipsetFamily {
    /// Resolve the register layout of this generation
    pub fn registers(&self) -> RegisterSet {
        let mut set = match self.parent {
            Some(parent) => parent.registers(),
            None => RegisterSet::BASE,
        };
        if let Some(spi_bar) = self.overrides.spi_bar {
            set.spi_bar = spi_bar;
        }
        if let Some(bios_cntl) = self.overrides.bios_cntl {
            set.bios_cntl = bios_cntl;
        }
        if let Some(gcs) = self.overrides.gcs {
            set.gcs = gcs;
        }
        set
    }

    /// Whether `device` belongs to this generation
    pub fn supports(&self, device: u16) -> bool {
        self.devices.iter().any(|d| d.id == device)
    }

    /// Whether `device` is a processor-integrated variant
    pub fn is_integrated_io(&self, device: u16) -> bool {
        self.integrated_io.contains(&device)
    }

    /// Marketing name of `device`, if it is part of this generation
    pub fn device_name(&self, device: u16) -> Option<&'static str> {
        self.devices.iter().find(|d| d.id == device).map(|d| d.name)
    }
}

impl core::fmt::Display for ChipsetFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Generation specific decoders
// ============================================================================

/// 6 Series and later implement SMM_BWP
fn decode_bios_cntl_pch(raw: u8) -> BiosCntl {
    BiosCntl {
        smm_bios_write_protect_disable: test(5, raw),
        ..BiosCntl::decode(raw)
    }
}

/// 6 and 7 Series encode the straps directly
fn decode_gcs_cougar_point(raw: u32, _integrated_io: bool) -> Gcs {
    const STRAPS: [BootBiosStraps; 4] = [
        BootBiosStraps::Lpc,
        BootBiosStraps::Reserved,
        BootBiosStraps::Pci,
        BootBiosStraps::Spi,
    ];
    Gcs {
        boot_bios_straps: STRAPS[value(11, 10, raw) as usize],
        ..Gcs::decode(raw, false)
    }
}

/// 8 Series dropped PCI boot; LP parts only use bit 10
fn decode_gcs_lynx_point(raw: u32, integrated_io: bool) -> Gcs {
    const STRAPS: [BootBiosStraps; 4] = [
        BootBiosStraps::Lpc,
        BootBiosStraps::Reserved,
        BootBiosStraps::Reserved,
        BootBiosStraps::Spi,
    ];
    const INTEGRATED_IO_STRAPS: [BootBiosStraps; 2] = [BootBiosStraps::Spi, BootBiosStraps::Lpc];

    let boot_bios_straps = if integrated_io {
        INTEGRATED_IO_STRAPS[value(10, 10, raw) as usize]
    } else {
        STRAPS[value(11, 10, raw) as usize]
    };
    Gcs {
        boot_bios_straps,
        ..Gcs::decode(raw, false)
    }
}

// ============================================================================
// Resolved register layout
// ============================================================================

/// Fully resolved register layout of a generation
#[derive(Debug, Clone, Copy)]
pub struct RegisterSet {
    /// Offset of the SPI register block inside the root complex window
    pub spi_bar: u16,
    pub bios_cntl: fn(u8) -> BiosCntl,
    pub rcba: fn(u32) -> Rcba,
    pub gcs: fn(u32, bool) -> Gcs,
    pub bfpr: fn(u32) -> Bfpr,
    pub hsfs: fn(u16) -> Hsfs,
    pub hsfs_encode: fn(&Hsfs) -> u16,
    pub hsfc: fn(u16) -> Hsfc,
    pub hsfc_encode: fn(&Hsfc) -> u16,
    pub faddr: fn(u32) -> Faddr,
    pub faddr_encode: fn(&Faddr) -> u32,
    pub frap: fn(u32) -> Frap,
    pub freg: fn(u32) -> FregN,
    pub pr: fn(u32) -> PrN,
    pub ssfs: fn(u8) -> Ssfs,
    pub ssfs_encode: fn(&Ssfs) -> u8,
    pub ssfc: fn(u32) -> Ssfc,
    pub ssfc_encode: fn(&Ssfc) -> u32,
}

impl RegisterSet {
    /// ICH8 layout, the root of every chain
    pub const BASE: Self = Self {
        spi_bar: SPIBAR_ICH8,
        bios_cntl: BiosCntl::decode,
        rcba: Rcba::decode,
        gcs: Gcs::decode,
        bfpr: Bfpr::decode,
        hsfs: Hsfs::decode,
        hsfs_encode: Hsfs::encode,
        hsfc: Hsfc::decode,
        hsfc_encode: Hsfc::encode,
        faddr: Faddr::decode,
        faddr_encode: Faddr::encode,
        frap: Frap::decode,
        freg: FregN::decode,
        pr: PrN::decode,
        ssfs: Ssfs::decode,
        ssfs_encode: Ssfs::encode,
        ssfc: Ssfc::decode,
        ssfc_encode: Ssfc::encode,
    };

    /// Absolute window offset of a SPI register
    #[inline]
    fn spi(&self, reg: u16) -> u64 {
        self.spi_bar as u64 + reg as u64
    }

    pub fn read_gcs<M: Mmio>(&self, window: &RootComplexWindow<M>, integrated_io: bool) -> Gcs {
        let raw = window.read32(RCRB_REG_GCS);
        log::debug!("GCS: {:#010x}", raw);
        (self.gcs)(raw, integrated_io)
    }

    pub fn read_bfpr<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Bfpr {
        (self.bfpr)(window.read32(self.spi(SPI_REG_BFPR)))
    }

    pub fn read_hsfs<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Hsfs {
        (self.hsfs)(window.read16(self.spi(SPI_REG_HSFS)))
    }

    pub fn write_hsfs<M: Mmio>(&self, window: &RootComplexWindow<M>, hsfs: &Hsfs) {
        window.write16(self.spi(SPI_REG_HSFS), (self.hsfs_encode)(hsfs));
    }

    pub fn read_hsfc<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Hsfc {
        (self.hsfc)(window.read16(self.spi(SPI_REG_HSFC)))
    }

    pub fn write_hsfc<M: Mmio>(&self, window: &RootComplexWindow<M>, hsfc: &Hsfc) {
        window.write16(self.spi(SPI_REG_HSFC), (self.hsfc_encode)(hsfc));
    }

    pub fn read_faddr<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Faddr {
        (self.faddr)(window.read32(self.spi(SPI_REG_FADDR)))
    }

    pub fn write_faddr<M: Mmio>(&self, window: &RootComplexWindow<M>, faddr: &Faddr) {
        window.write32(self.spi(SPI_REG_FADDR), (self.faddr_encode)(faddr));
    }

    /// Read FDATA register `index`
    ///
    /// # Panics
    ///
    /// If `index` is not below [`FDATA_COUNT`].
    pub fn read_fdata<M: Mmio>(&self, window: &RootComplexWindow<M>, index: usize) -> u32 {
        assert!(index < FDATA_COUNT, "FDATA index {} out of range", index);
        window.read32(self.spi(SPI_REG_FDATA0 + 4 * index as u16))
    }

    pub fn read_frap<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Frap {
        (self.frap)(window.read32(self.spi(SPI_REG_FRAP)))
    }

    /// Read flash region `index`
    ///
    /// # Panics
    ///
    /// If `index` is not below [`NUM_FLASH_REGIONS`].
    pub fn read_freg<M: Mmio>(&self, window: &RootComplexWindow<M>, index: usize) -> FregN {
        assert!(index < NUM_FLASH_REGIONS, "FREG index {} out of range", index);
        (self.freg)(window.read32(self.spi(SPI_REG_FREG0 + 4 * index as u16)))
    }

    /// Read protected range `index`
    ///
    /// # Panics
    ///
    /// If `index` is not below [`NUM_FLASH_REGIONS`].
    pub fn read_pr<M: Mmio>(&self, window: &RootComplexWindow<M>, index: usize) -> PrN {
        assert!(index < NUM_FLASH_REGIONS, "PR index {} out of range", index);
        (self.pr)(window.read32(self.spi(SPI_REG_PR0 + 4 * index as u16)))
    }

    pub fn read_ssfs<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Ssfs {
        (self.ssfs)(window.read8(self.spi(SPI_REG_SSFS)))
    }

    pub fn write_ssfs<M: Mmio>(&self, window: &RootComplexWindow<M>, ssfs: &Ssfs) {
        window.write8(self.spi(SPI_REG_SSFS), (self.ssfs_encode)(ssfs));
    }

    /// Read the 24-bit SSFC as a 16-bit and an 8-bit access
    pub fn read_ssfc<M: Mmio>(&self, window: &RootComplexWindow<M>) -> Ssfc {
        let low = window.read16(self.spi(SPI_REG_SSFC)) as u32;
        let high = window.read8(self.spi(SPI_REG_SSFC + 2)) as u32;
        (self.ssfc)(high << 16 | low)
    }

    /// Write SSFC, upper byte first so that SCGO goes out with the last write
    pub fn write_ssfc<M: Mmio>(&self, window: &RootComplexWindow<M>, ssfc: &Ssfc) {
        let raw = (self.ssfc_encode)(ssfc);
        window.write8(self.spi(SPI_REG_SSFC + 2), (raw >> 16) as u8);
        window.write16(self.spi(SPI_REG_SSFC), raw as u16);
    }
}

// ============================================================================
// Families
// ============================================================================

pub static ICH8: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Ich8,
    name: "Intel ICH8",
    parent: None,
    devices: &[
        DeviceId::new(0x2810, "ICH8/ICH8R"),
        DeviceId::new(0x2811, "ICH8M-E"),
        DeviceId::new(0x2812, "ICH8DH"),
        DeviceId::new(0x2814, "ICH8DO"),
        // ICH8M shares the ICH8 SPI block
        DeviceId::new(0x2815, "ICH8M"),
    ],
    integrated_io: &[],
    overrides: RegisterOverrides::NONE,
};

pub static ICH9: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Ich9,
    name: "Intel ICH9",
    parent: Some(&ICH8),
    devices: &[
        DeviceId::new(0x2912, "ICH9DH"),
        DeviceId::new(0x2914, "ICH9DO"),
        DeviceId::new(0x2916, "ICH9R"),
        DeviceId::new(0x2917, "ICH9M-E"),
        DeviceId::new(0x2918, "ICH9"),
        DeviceId::new(0x2919, "ICH9M"),
    ],
    integrated_io: &[],
    overrides: RegisterOverrides {
        spi_bar: Some(SPIBAR_ICH9),
        ..RegisterOverrides::NONE
    },
};

pub static ICH10: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Ich10,
    name: "Intel ICH10",
    parent: Some(&ICH9),
    devices: &[
        DeviceId::new(0x3A14, "ICH10DO"),
        DeviceId::new(0x3A16, "ICH10R"),
        DeviceId::new(0x3A18, "ICH10"),
        DeviceId::new(0x3A1A, "ICH10D"),
    ],
    integrated_io: &[],
    overrides: RegisterOverrides::NONE,
};

pub static SERIES6: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Series6CougarPoint,
    name: "Intel 6 Series",
    parent: Some(&ICH10),
    devices: &[
        DeviceId::new(0x1C44, "Z68"),
        DeviceId::new(0x1C46, "P67"),
        DeviceId::new(0x1C47, "UM67"),
        DeviceId::new(0x1C49, "HM65"),
        DeviceId::new(0x1C4A, "H67"),
        DeviceId::new(0x1C4B, "HM67"),
        DeviceId::new(0x1C4C, "Q65"),
        DeviceId::new(0x1C4D, "QS67"),
        DeviceId::new(0x1C4E, "Q67"),
        DeviceId::new(0x1C4F, "QM67"),
        DeviceId::new(0x1C50, "B65"),
        DeviceId::new(0x1C52, "C202"),
        DeviceId::new(0x1C54, "C204"),
        DeviceId::new(0x1C56, "C206"),
        DeviceId::new(0x1C5C, "H61"),
        DeviceId::new(0x1D40, "C606/C608"),
        DeviceId::new(0x1D41, "C600"),
    ],
    integrated_io: &[],
    overrides: RegisterOverrides {
        bios_cntl: Some(decode_bios_cntl_pch),
        gcs: Some(decode_gcs_cougar_point),
        ..RegisterOverrides::NONE
    },
};

pub static SERIES7: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Series7PantherPoint,
    name: "Intel 7 Series",
    parent: Some(&SERIES6),
    devices: &[
        DeviceId::new(0x1E44, "Z77"),
        DeviceId::new(0x1E46, "Z75"),
        DeviceId::new(0x1E47, "Q77"),
        DeviceId::new(0x1E48, "Q75"),
        DeviceId::new(0x1E49, "B75"),
        DeviceId::new(0x1E4A, "H77"),
        DeviceId::new(0x1E53, "C216"),
        DeviceId::new(0x1E55, "QM77"),
        DeviceId::new(0x1E56, "QS77"),
        DeviceId::new(0x1E57, "HM77"),
        DeviceId::new(0x1E58, "UM77"),
        DeviceId::new(0x1E59, "HM76"),
        DeviceId::new(0x1E5D, "HM75"),
        DeviceId::new(0x1E5E, "HM70"),
        DeviceId::new(0x1E5F, "NM70"),
    ],
    integrated_io: &[],
    overrides: RegisterOverrides::NONE,
};

pub static SERIES8: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Series8LynxPoint,
    name: "Intel 8 Series",
    parent: Some(&SERIES7),
    devices: &[
        DeviceId::new(0x8C41, "Lynx Point Mobile Engineering Sample"),
        DeviceId::new(0x8C42, "Lynx Point Desktop Engineering Sample"),
        DeviceId::new(0x8C44, "Z87"),
        DeviceId::new(0x8C46, "Z85"),
        DeviceId::new(0x8C49, "HM86"),
        DeviceId::new(0x8C4A, "H87"),
        DeviceId::new(0x8C4B, "HM87"),
        DeviceId::new(0x8C4C, "Q85"),
        DeviceId::new(0x8C4E, "Q87"),
        DeviceId::new(0x8C4F, "QM87"),
        DeviceId::new(0x8C50, "B85"),
        DeviceId::new(0x8C52, "C222"),
        DeviceId::new(0x8C54, "C224"),
        DeviceId::new(0x8C56, "C226"),
        DeviceId::new(0x8C5C, "H81"),
        DeviceId::new(0x9C41, "Lynx Point LP Engineering Sample"),
        DeviceId::new(0x9C43, "Lynx Point LP Premium"),
        DeviceId::new(0x9C45, "Lynx Point LP Mainstream"),
    ],
    integrated_io: &[0x9C41, 0x9C43, 0x9C45],
    overrides: RegisterOverrides {
        gcs: Some(decode_gcs_lynx_point),
        ..RegisterOverrides::NONE
    },
};

pub static SERIES9: ChipsetFamily = ChipsetFamily {
    generation: IchChipset::Series9WildcatPoint,
    name: "Intel 9 Series",
    parent: Some(&SERIES8),
    devices: &[
        DeviceId::new(0x8CC2, "9 Series Engineering Sample"),
        DeviceId::new(0x8CC4, "Z97"),
        DeviceId::new(0x8CC6, "H97"),
        DeviceId::new(0x9CC1, "Haswell U Sample"),
        DeviceId::new(0x9CC2, "Broadwell U Sample"),
        DeviceId::new(0x9CC3, "Broadwell U Premium"),
        DeviceId::new(0x9CC5, "Broadwell U Base"),
        DeviceId::new(0x9CC6, "Broadwell Y Sample"),
        DeviceId::new(0x9CC7, "Broadwell Y Premium"),
        DeviceId::new(0x9CC9, "Broadwell Y Base"),
    ],
    integrated_io: &[0x9CC1, 0x9CC2, 0x9CC3, 0x9CC5, 0x9CC6, 0x9CC7, 0x9CC9],
    overrides: RegisterOverrides::NONE,
};

/// All supported generations, oldest first
pub static FAMILIES: &[&ChipsetFamily] = &[
    &ICH8, &ICH9, &ICH10, &SERIES6, &SERIES7, &SERIES8, &SERIES9,
];

/// Find the chipset family of a probed LPC bridge
///
/// The first generation (oldest first) listing the device wins. The revision
/// is never considered.
pub fn resolve(id: &HardwareId) -> Result<&'static ChipsetFamily> {
    if id.vendor != INTEL_VID {
        return Err(Error::Unsupported {
            id: *id,
            reason: "only Intel chipsets are supported",
        });
    }

    FAMILIES
        .iter()
        .copied()
        .find(|family| family.supports(id.device))
        .ok_or(Error::Unsupported {
            id: *id,
            reason: "unsupported Intel chipset",
        })
}
