use std::fs;
use tempfile::tempdir;
use gbc_trace_core::cartridge::{CgbSupport, Rom};
use gbc_trace_core::error::RomError;

#[test]
fn rom_loads_from_disk() {
    let dir = tempdir().unwrap();
    let rom_path = dir.path().join("game.gbc");

    let mut rom = vec![0u8; 0x6000];
    rom[0x0134..0x0138].copy_from_slice(b"DEMO");
    rom[0x0143] = 0xC0; // CGB only
    rom[0x0147] = 0x1B; // MBC5 + RAM + Battery
    rom[0x4000] = 0x42;
    fs::write(&rom_path, &rom).unwrap();

    let rom = Rom::from_file(&rom_path).unwrap();
    assert_eq!(rom.bank_count(), 2);
    assert_eq!(rom.bank(1).unwrap()[0], 0x42);
    assert_eq!(rom.bank(1).unwrap()[0x3FFF], 0x00);

    let header = rom.header();
    assert_eq!(header.title, "DEMO");
    assert_eq!(header.cgb, CgbSupport::CgbOnly);
    assert_eq!(header.mapper, "MBC5+RAM+BATTERY");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = Rom::from_file(dir.path().join("absent.gb")).unwrap_err();
    assert!(matches!(err, RomError::Io(_)));
}

#[test]
fn empty_file_is_rejected() {
    let dir = tempdir().unwrap();
    let rom_path = dir.path().join("empty.gb");
    fs::write(&rom_path, b"").unwrap();
    assert!(matches!(Rom::from_file(&rom_path), Err(RomError::Empty)));
}
