//! pchflash - Extract BIOS/UEFI firmware from Intel ICH/PCH SPI flash
//!
//! Reads the whole SPI flash through the chipset's hardware sequencer and
//! writes it to a file. Needs root for port I/O and `/dev/mem`.
//!
//! # Usage
//!
//! ```bash
//! sudo pchflash                          # Dump 16 MiB to bios_via_spi_hs.bin
//! sudo pchflash dump.bin --flash-size 0x800000
//! sudo pchflash --stop-on-error --max-polls 1000000 dump.bin
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::LevelFilter;

use pchflash::drivers::pci::PortIo;
use pchflash::drivers::physmem::DevMem;
use pchflash::drivers::spi::intel::probe_hardware_id;
use pchflash::drivers::spi::regs::{BootBiosStraps, NUM_FLASH_REGIONS};
use pchflash::drivers::spi::{Chipset, PollLimit};
use pchflash::logger;

/// Print a progress dot every this many blocks
const BLOCKS_PER_DOT: u32 = 256;

#[derive(Parser)]
#[command(name = "pchflash", version)]
#[command(about = "Extract BIOS/UEFI firmware via SPI hardware sequencing")]
struct Cli {
    /// Output file
    #[arg(default_value = "bios_via_spi_hs.bin")]
    output: PathBuf,

    /// Do not display version information
    #[arg(long)]
    no_logo: bool,

    /// Number of bytes to read
    #[arg(long, default_value = "0x1000000", value_parser = parse_number)]
    flash_size: u32,

    /// First flash address to read
    #[arg(long, default_value = "0", value_parser = parse_number)]
    start: u32,

    /// Bytes per hardware sequencing cycle (multiple of 4, 4 to 64)
    #[arg(long, default_value = "64", value_parser = parse_number)]
    block_size: u32,

    /// Give up on a flash cycle after this many status polls
    #[arg(long)]
    max_polls: Option<u64>,

    /// Stop at the first block the chipset refuses to read
    #[arg(long)]
    stop_on_error: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, env = "PCHFLASH_LOG", default_value = "warn", value_parser = parse_level)]
    log_level: LevelFilter,
}

/// Parse a decimal or `0x` prefixed hexadecimal number
fn parse_number(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

/// Parse a log level name
fn parse_level(s: &str) -> std::result::Result<LevelFilter, String> {
    s.parse()
        .map_err(|e: log::ParseLevelError| format!("invalid log level '{}': {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.log_level);

    if !cli.no_logo {
        println!(
            "{} {}, {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_DESCRIPTION")
        );
    }

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    // PCI configuration space is only reachable with ring-3 I/O privileges
    println!("Acquiring I/O port read permissions, this may fail...");
    let pci = PortIo::new().context("cannot access PCI configuration space")?;

    print!("Reading chipset LPC device identification: ");
    let id = probe_hardware_id(&pci);
    println!("  {} ({})", id, id.revision);
    let mut chipset = Chipset::probe(pci, DevMem).context("chipset detection failed")?;
    if let Some(max_polls) = cli.max_polls {
        chipset.set_poll_limit(PollLimit::Iterations(max_polls));
    }

    let rcba = chipset.read_rcba();
    println!(
        "Mapping 16KiB chipset configuration space at RCBA = {:#010X}, this may fail...",
        rcba.base_address
    );
    chipset.map_root_complex(&rcba).context(
        "cannot map the root complex register block\n\
         Check if your kernel was compiled with IO_STRICT_DEVMEM=y.\n\
         On Debian kernels > 4.8.4, boot with iomem=relaxed to\n\
         temporarily disable /dev/mem IO protection.",
    )?;

    let gcs = chipset.read_gcs();
    println!("Boot BIOS Straps (BBS): {}", gcs.boot_bios_straps);
    if gcs.boot_bios_straps != BootBiosStraps::Spi {
        bail!("BIOS not located in SPI flash");
    }

    let bfpr = chipset.read_bfpr();
    println!(
        "PRB: {:#010X}  PRL: {:#010X}",
        bfpr.bios_flash_primary_region_base, bfpr.bios_flash_primary_region_limit
    );
    println!("FRAP: {:#010X}", chipset.read_frap().to_raw());

    let regions: Vec<_> = (0..NUM_FLASH_REGIONS)
        .map(|i| (chipset.read_freg(i), chipset.read_pr(i)))
        .collect();
    for (i, (freg, _)) in regions.iter().enumerate() {
        println!(
            "FREG{}  Base: {:#010X}  Limit: {:#010X}",
            i, freg.region_base, freg.region_limit
        );
    }

    println!("BIOS protection mechanisms:");
    let hsfs = chipset.read_hsfs();
    println!(
        "  HSFS Flash Configuration Lock-Down (FLOCKDN): {}",
        hsfs.flash_configuration_lockdown as u8
    );
    let bios_cntl = chipset.read_bios_cntl();
    println!("  BIOS Control Register (BIOS_CNTL):");
    println!(
        "    SMM BIOS Write Protect Disable (SMM_BWP):   {}",
        bios_cntl.smm_bios_write_protect_disable as u8
    );
    println!(
        "    BIOS Lock Enable (BLE):                     {}",
        bios_cntl.bios_lock_enable as u8
    );
    println!(
        "    BIOS Write Enable (BIOSWE):                 {}",
        bios_cntl.bios_write_enable as u8
    );

    println!("  Protected Range Registers:");
    for (i, (_, pr)) in regions.iter().enumerate() {
        println!(
            "    PR{} Write Protection Enable: {}",
            i, pr.write_protection_enable as u8
        );
        println!(
            "        Read Protection Enable:  {}",
            pr.read_protection_enable as u8
        );
        println!(
            "        Protected Range Base:    {:#010X}  Limit: {:#010X}",
            pr.protected_range_base, pr.protected_range_limit
        );
    }

    // Non-descriptor mode (pre-2009 machines) is not supported
    println!(
        "Flash Descriptor Valid (FDV): {}",
        hsfs.flash_descriptor_valid as u8
    );
    if !hsfs.flash_descriptor_valid {
        bail!("system not in descriptor mode");
    }

    let file = File::create(&cli.output)
        .with_context(|| format!("could not open {} for writing", cli.output.display()))?;
    let mut dump = BufWriter::new(file);

    print!("Reading SPI flash");
    std::io::stdout().flush()?;

    if chipset.read_ssfs().spi_cycle_in_progress {
        bail!("SPI flash cycle in progress");
    }

    let block_size = cli.block_size;
    let start = cli.start;
    let mut write_error = None;
    let mut failed_blocks = 0u32;
    let mut on_error = |address: u32| {
        log::warn!("Could not read block at {:#010x}", address);
        failed_blocks += 1;
        !cli.stop_on_error
    };
    let mut on_done = || println!();

    chipset.read_spi(
        start,
        cli.flash_size,
        block_size,
        |address, data| {
            if address.wrapping_sub(start) / block_size % BLOCKS_PER_DOT == 0 {
                print!(".");
                if let Err(e) = std::io::stdout().flush() {
                    log::debug!("stdout flush failed: {}", e);
                }
            }
            match dump.write_all(data) {
                Ok(()) => true,
                Err(e) => {
                    write_error = Some(e);
                    false
                }
            }
        },
        Some(&mut on_error),
        Some(&mut on_done),
    )?;

    if let Some(e) = write_error {
        return Err(e).with_context(|| format!("could not write {}", cli.output.display()));
    }
    dump.flush()
        .with_context(|| format!("could not write {}", cli.output.display()))?;

    if failed_blocks > 0 {
        log::warn!("{} blocks could not be read", failed_blocks);
    }
    log::info!("Wrote {}", cli.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("64"), Ok(64));
        assert_eq!(parse_number("0x1000000"), Ok(16 << 20));
        assert_eq!(parse_number("0X40"), Ok(64));
        assert!(parse_number("0xZZ").is_err());
        assert!(parse_number("").is_err());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Ok(LevelFilter::Trace));
        assert_eq!(parse_level("OFF"), Ok(LevelFilter::Off));
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pchflash"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("bios_via_spi_hs.bin"));
        assert_eq!(cli.flash_size, 16 << 20);
        assert_eq!(cli.start, 0);
        assert_eq!(cli.block_size, 64);
        assert_eq!(cli.max_polls, None);
        assert!(!cli.stop_on_error);
        assert!(!cli.no_logo);
        assert_eq!(cli.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "pchflash",
            "dump.bin",
            "--no-logo",
            "--flash-size",
            "0x800000",
            "--block-size",
            "32",
            "--max-polls",
            "1000",
            "--stop-on-error",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.output, PathBuf::from("dump.bin"));
        assert_eq!(cli.flash_size, 0x80_0000);
        assert_eq!(cli.block_size, 32);
        assert_eq!(cli.max_polls, Some(1000));
        assert!(cli.stop_on_error);
        assert!(cli.no_logo);
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }
}
