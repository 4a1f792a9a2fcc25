//! pchflash - Dump the SPI flash of Intel ICH/PCH chipsets
//!
//! This library detects ICH8 through 9 Series chipsets, decodes their SPI
//! controller registers and reads the flash contents with the controller's
//! hardware sequencer. Protected regions that fail to read are reported
//! block by block instead of aborting the dump.

pub mod bits;
pub mod drivers;
pub mod error;
pub mod logger;

pub use error::{Error, Result};
