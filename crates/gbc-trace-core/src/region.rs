//! Address-space classification shared by execution attribution and the
//! memory-access filter.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::ParseRegionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Boot ROM overlaid on the low address space.
    Boot,
    Rom,
    Vram,
    ExternalRam,
    WorkRam,
    Oam,
    NotUsable,
    Io,
    HighRam,
    /// The IE register at 0xFFFF.
    InterruptEnable,
}

impl Region {
    pub const ALL: [Region; 10] = [
        Region::Boot,
        Region::Rom,
        Region::Vram,
        Region::ExternalRam,
        Region::WorkRam,
        Region::Oam,
        Region::NotUsable,
        Region::Io,
        Region::HighRam,
        Region::InterruptEnable,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Rom => "rom",
            Self::Vram => "vram",
            Self::ExternalRam => "eram",
            Self::WorkRam => "ram",
            Self::Oam => "oam",
            Self::NotUsable => "not-usable",
            Self::Io => "io",
            Self::HighRam => "hram",
            Self::InterruptEnable => "int",
        }
    }

    fn mask_bit(self) -> u16 {
        match self {
            Self::Rom => 0x001,
            Self::Vram => 0x002,
            Self::ExternalRam => 0x004,
            Self::WorkRam => 0x008,
            Self::Oam => 0x010,
            Self::NotUsable => 0x020,
            Self::Io => 0x040,
            Self::HighRam => 0x080,
            Self::InterruptEnable => 0x100,
            Self::Boot => 0x200,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Region::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| ParseRegionError(s.to_string()))
    }
}

/// Map `addr` to its region. The CGB boot ROM covers 0x0000-0x00FF and
/// 0x0200-0x08FF while mapped; the cartridge header at 0x0100-0x01FF always
/// stays visible.
pub fn classify(addr: u16, boot_mapped: bool) -> Region {
    match addr {
        0x0000..=0x00FF | 0x0200..=0x08FF if boot_mapped => Region::Boot,
        0x0000..=0x7FFF => Region::Rom,
        0x8000..=0x9FFF => Region::Vram,
        0xA000..=0xBFFF => Region::ExternalRam,
        0xC000..=0xFDFF => Region::WorkRam,
        0xFE00..=0xFE9F => Region::Oam,
        0xFEA0..=0xFEFF => Region::NotUsable,
        0xFF00..=0xFF7F => Region::Io,
        0xFF80..=0xFFFE => Region::HighRam,
        0xFFFF => Region::InterruptEnable,
    }
}

/// Set of regions whose memory accesses get printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegionMask(u16);

impl RegionMask {
    pub const NONE: RegionMask = RegionMask(0);
    pub const ALL: RegionMask = RegionMask(0x3FF);

    pub fn from_bits(bits: u16) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, region: Region) -> bool {
        self.0 & region.mask_bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, region: Region) {
        self.0 |= region.mask_bit();
    }

    pub fn regions(self) -> impl Iterator<Item = Region> {
        Region::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl From<Region> for RegionMask {
    fn from(region: Region) -> Self {
        Self(region.mask_bit())
    }
}

impl FromIterator<Region> for RegionMask {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        let mut mask = Self::NONE;
        for r in iter {
            mask.insert(r);
        }
        mask
    }
}

impl BitOr<Region> for RegionMask {
    type Output = RegionMask;

    fn bitor(mut self, rhs: Region) -> Self::Output {
        self.insert(rhs);
        self
    }
}

impl BitOrAssign<Region> for RegionMask {
    fn bitor_assign(&mut self, rhs: Region) {
        self.insert(rhs);
    }
}

/// Parses a comma-separated list such as `"oam,io,hram"`, or `"all"`.
impl FromStr for RegionMask {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mask = Self::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if part.eq_ignore_ascii_case("all") {
                mask = Self::ALL;
                continue;
            }
            mask.insert(part.parse()?);
        }
        Ok(mask)
    }
}
