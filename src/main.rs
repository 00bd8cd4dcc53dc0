mod config;
mod sweep;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gbc_trace_core::cartridge::RomHeader;
use gbc_trace_core::region::RegionMask;
use gbc_trace_core::{Rom, Tracer};
use log::info;

use crate::sweep::Sweep;

#[derive(Parser)]
#[command(name = "gbctrace", version, about = "Game Boy Color ROM tracer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cartridge header
    Info {
        /// Path to ROM file
        rom: PathBuf,
    },
    /// Decode instructions from a ROM and feed them through the tracer
    Disasm(DisasmArgs),
}

#[derive(clap::Args)]
struct DisasmArgs {
    /// Path to ROM file
    rom: PathBuf,

    /// Bank mapped at 0x4000
    #[arg(long, default_value_t = 1)]
    bank: usize,

    /// First address to decode (0x-prefixed hex or decimal)
    #[arg(long, value_parser = parse_addr, default_value = "0x0100")]
    start: u16,

    /// Number of instructions to decode
    #[arg(long, default_value_t = 32)]
    count: usize,

    /// Print the execution report at the end
    #[arg(long)]
    report: bool,

    /// Do not print decoded instructions
    #[arg(long)]
    quiet: bool,

    /// Print mapper changes
    #[arg(long)]
    mapper: bool,

    /// Print memory accesses in these regions, e.g. `rom,io` or `all`
    #[arg(long)]
    mem: Option<RegionMask>,

    /// Trace options file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

fn print_header(h: &RomHeader, banks: usize) {
    let license = match &h.new_license {
        Some(code) => code.clone(),
        None => format!("{:02X}H", h.old_license),
    };
    let size = |v: Option<u32>| v.map_or_else(|| "unknown".to_string(), |n| n.to_string());

    println!("NBanks: {banks}");
    println!("Logo: {}", h.logo_ok);
    println!("Title: {}", h.title);
    println!("Manufacturer code: {}", h.manufacturer);
    println!("CGB flag: {}", h.cgb.describe());
    println!("License code: {license}");
    println!("SGB functions support: {}", h.sgb);
    println!("Mapper: {}", h.mapper);
    println!("ROM size (16K banks): {}", size(h.rom_banks));
    println!("RAM size (KB): {}", size(h.ram_kib));
    println!("Japanese ROM: {}", h.japanese);
    println!("Version: {}", h.version);
    println!("Checksum: {}", h.checksum);
    println!("Checksum ok: {}", h.checksum_ok);
    println!("Global Checksum: {}", h.global_checksum);
    println!("Global Checksum ok: {}", h.global_checksum_ok);
}

fn disasm(rom: Rom, args: &DisasmArgs) -> Result<(), String> {
    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut options = config::load_from_file(&config_path).to_options();
    if args.quiet {
        options.print_instructions = false;
    }
    if args.mapper {
        options.print_mapper_changes = true;
    }
    if let Some(mask) = args.mem {
        options.mem_regions = mask;
    }

    if args.bank >= rom.bank_count() {
        return Err(format!(
            "bank {} out of range (ROM has {} banks)",
            args.bank,
            rom.bank_count()
        ));
    }

    let mut sweep = Sweep::new(rom);
    let stdout = io::stdout();
    let mut tracer = Tracer::new(options, BufWriter::new(stdout.lock()));

    sweep.select_bank(args.bank);
    tracer.mapper_changed(&sweep).map_err(|e| e.to_string())?;

    let decoded = sweep
        .run(&mut tracer, args.start, args.count)
        .map_err(|e| e.to_string())?;
    info!("Decoded {decoded} instructions from {:04X}", args.start);

    if args.report {
        tracer.dump().map_err(|e| e.to_string())?;
    }
    tracer
        .into_inner()
        .flush()
        .map_err(|e| format!("failed to write trace output: {e}"))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let path = match &args.command {
        Command::Info { rom } => rom,
        Command::Disasm(d) => &d.rom,
    };
    let rom = match Rom::from_file(path) {
        Ok(rom) => rom,
        Err(e) => {
            eprintln!("Failed to load ROM {}: {e}", path.display());
            std::process::exit(1);
        }
    };

    match &args.command {
        Command::Info { .. } => print_header(&rom.header(), rom.bank_count()),
        Command::Disasm(d) => {
            if let Err(e) = disasm(rom, d) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_accept_hex_and_decimal() {
        assert_eq!(parse_addr("0x0150"), Ok(0x0150));
        assert_eq!(parse_addr("0X4000"), Ok(0x4000));
        assert_eq!(parse_addr("336"), Ok(336));
        assert!(parse_addr("0x10000").is_err());
        assert!(parse_addr("zz").is_err());
    }

    #[test]
    fn disasm_flags_parse() {
        let args = Args::try_parse_from([
            "gbctrace", "disasm", "game.gbc", "--bank", "3", "--start", "0x4000", "--mem",
            "oam,io", "--report", "--quiet",
        ])
        .unwrap();
        let Command::Disasm(d) = args.command else {
            panic!("expected disasm");
        };
        assert_eq!(d.bank, 3);
        assert_eq!(d.start, 0x4000);
        assert_eq!(d.count, 32);
        assert!(d.report && d.quiet && !d.mapper);
        assert_eq!(d.mem, Some("oam,io".parse().unwrap()));
    }

    #[test]
    fn bad_region_is_rejected() {
        assert!(Args::try_parse_from(["gbctrace", "disasm", "g.gb", "--mem", "vram,nope"]).is_err());
    }
}
