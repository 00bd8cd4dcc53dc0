use std::{fs, path::Path};

use log::debug;

use crate::error::RomError;

pub const BANK_SIZE: usize = 0x4000;

/// The CGB boot ROM only compares the first half of this.
const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// Cartridge ROM split into 16 KiB banks. A trailing partial bank is padded
/// with zeros.
#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn from_bytes(mut data: Vec<u8>) -> Result<Self, RomError> {
        if data.is_empty() {
            return Err(RomError::Empty);
        }
        let padded = data.len().div_ceil(BANK_SIZE) * BANK_SIZE;
        data.resize(padded, 0);
        Ok(Self { data })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let data = fs::read(&path)?;
        let rom = Self::from_bytes(data)?;
        debug!(
            "Loaded ROM {} ({} banks)",
            path.as_ref().display(),
            rom.bank_count()
        );
        Ok(rom)
    }

    pub fn bank_count(&self) -> usize {
        self.data.len() / BANK_SIZE
    }

    pub fn bank(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(BANK_SIZE)?;
        self.data.get(start..start + BANK_SIZE)
    }

    pub fn header(&self) -> RomHeader {
        Header::parse(&self.data).summary()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgbSupport {
    CgbOnly,
    CgbEnhanced,
    DmgOnly,
}

impl CgbSupport {
    pub fn describe(self) -> &'static str {
        match self {
            Self::CgbOnly => "GBC only",
            Self::CgbEnhanced => "GB with GBC support",
            Self::DmgOnly => "GB only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    pub title: String,
    /// Empty when the title runs into the manufacturer field.
    pub manufacturer: String,
    pub cgb: CgbSupport,
    pub old_license: u8,
    /// Only set when `old_license == 0x33`.
    pub new_license: Option<String>,
    pub sgb: bool,
    pub cart_type: u8,
    pub mapper: &'static str,
    /// In 16 KiB banks, as declared by the header.
    pub rom_banks: Option<u32>,
    /// In KiB.
    pub ram_kib: Option<u32>,
    pub japanese: bool,
    pub version: u8,
    pub checksum: u8,
    pub checksum_ok: bool,
    pub global_checksum: u16,
    pub global_checksum_ok: bool,
    pub logo_ok: bool,
}

struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn byte(&self, addr: usize) -> u8 {
        self.data.get(addr).copied().unwrap_or(0)
    }

    fn cgb_support(&self) -> CgbSupport {
        match self.byte(0x0143) {
            0xC0 => CgbSupport::CgbOnly,
            flag if flag & 0x80 != 0 => CgbSupport::CgbEnhanced,
            _ => CgbSupport::DmgOnly,
        }
    }

    fn title_and_manufacturer(&self) -> (String, String) {
        let title_char = |b: u8| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b' ';
        let max = if self.cgb_support() == CgbSupport::DmgOnly {
            16
        } else {
            15
        };
        let title: String = (0x0134..0x0134 + max)
            .map(|a| self.byte(a))
            .take_while(|&b| title_char(b))
            .map(char::from)
            .collect();

        // Newer carts shorten the title to 11 characters and put a four
        // letter manufacturer code at 0x013F.
        let mut manufacturer = String::new();
        if self.cgb_support() != CgbSupport::DmgOnly && (title.len() <= 11 || title.len() == 15)
        {
            let code: Vec<u8> = (0x013F..0x0143).map(|a| self.byte(a)).collect();
            if code.iter().all(|b| b.is_ascii_uppercase()) {
                manufacturer = code.into_iter().map(char::from).collect();
            }
        }

        let title = if manufacturer.is_empty() {
            title
        } else {
            title.chars().take(11).collect()
        };
        (title.trim_end().to_string(), manufacturer)
    }

    fn rom_banks(&self) -> Option<u32> {
        match self.byte(0x0148) {
            code @ 0x00..=0x08 => Some(2u32 << code),
            0x52 => Some(72),
            0x53 => Some(80),
            0x54 => Some(96),
            _ => None,
        }
    }

    fn ram_kib(&self) -> Option<u32> {
        match self.byte(0x0149) {
            0x00 => Some(0),
            0x01 => Some(2),
            0x02 => Some(8),
            0x03 => Some(32),
            0x04 => Some(128),
            0x05 => Some(64),
            _ => None,
        }
    }

    fn header_checksum(&self) -> u8 {
        (0x0134..=0x014C).fold(0u8, |acc, a| acc.wrapping_sub(self.byte(a)).wrapping_sub(1))
    }

    fn global_checksum(&self) -> u16 {
        u16::from_be_bytes([self.byte(0x014E), self.byte(0x014F)])
    }

    fn summary(&self) -> RomHeader {
        let (title, manufacturer) = self.title_and_manufacturer();
        let old_license = self.byte(0x014B);
        let new_license = (old_license == 0x33).then(|| {
            [self.byte(0x0144), self.byte(0x0145)]
                .into_iter()
                .map(char::from)
                .collect::<String>()
        });
        let cart_type = self.byte(0x0147);
        let checksum = self.byte(0x014D);
        let global_checksum = self.global_checksum();
        let computed_global = self
            .data
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 0x014E && *i != 0x014F)
            .fold(0u16, |acc, (_, &b)| acc.wrapping_add(b as u16));
        let logo_ok = self.data.get(0x0104..0x011C) == Some(&NINTENDO_LOGO[..24]);

        RomHeader {
            title,
            manufacturer,
            cgb: self.cgb_support(),
            old_license,
            new_license,
            sgb: self.byte(0x0146) == 0x03,
            cart_type,
            mapper: mapper_name(cart_type),
            rom_banks: self.rom_banks(),
            ram_kib: self.ram_kib(),
            japanese: self.byte(0x014A) == 0x00,
            version: self.byte(0x014C),
            checksum,
            checksum_ok: self.header_checksum() == checksum,
            global_checksum,
            global_checksum_ok: computed_global == global_checksum,
            logo_ok,
        }
    }
}

pub fn mapper_name(cart_type: u8) -> &'static str {
    match cart_type {
        0x00 => "ROM",
        0x01 => "MBC1",
        0x02 => "MBC1+RAM",
        0x03 => "MBC1+RAM+BATTERY",
        0x05 => "MBC2",
        0x06 => "MBC2+BATTERY",
        0x08 => "ROM+RAM",
        0x09 => "ROM+RAM+BATTERY",
        0x0B => "MMM01",
        0x0C => "MMM01+RAM",
        0x0D => "MMM01+RAM+BATTERY",
        0x0F => "MBC3+TIMER+BATTERY",
        0x10 => "MBC3+TIMER+RAM+BATTERY",
        0x11 => "MBC3",
        0x12 => "MBC3+RAM",
        0x13 => "MBC3+RAM+BATTERY",
        0x15 => "MBC4",
        0x16 => "MBC4+RAM",
        0x17 => "MBC4+RAM+BATTERY",
        0x19 => "MBC5",
        0x1A => "MBC5+RAM",
        0x1B => "MBC5+RAM+BATTERY",
        0x1C => "MBC5+RUMBLE",
        0x1D => "MBC5+RUMBLE+RAM",
        0x1E => "MBC5+RUMBLE+RAM+BATTERY",
        0xFC => "POCKET CAMERA",
        0xFD => "BANDAI TAMA5",
        0xFE => "HuC3",
        0xFF => "HuC1+RAM+BATTERY",
        _ => "Unknown",
    }
}
