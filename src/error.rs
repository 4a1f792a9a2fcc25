//! Error type shared by the chipset, PCI and physical memory layers

use crate::drivers::spi::intel_chipsets::HardwareId;

/// Errors returned by chipset probing, mapping and flash reads
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not an Intel chipset, or no known chipset family matches the device id
    #[error("{reason} ({id})")]
    Unsupported {
        /// The probed identity of the LPC bridge
        id: HardwareId,
        reason: &'static str,
    },
    /// Malformed register contents or request parameters
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A hardware sequencing cycle is already running
    #[error("SPI flash cycle in progress")]
    Busy,
    /// Privileged I/O or physical memory access was refused by the OS
    #[error("{what}: {source}")]
    ResourceAcquisition {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },
    /// The configured poll limit was reached before the cycle finished
    #[error("flash cycle at {address:#08x} not done after {polls} polls")]
    Timeout { address: u32, polls: u64 },
}

/// Result type for chipset operations
pub type Result<T> = core::result::Result<T, Error>;
