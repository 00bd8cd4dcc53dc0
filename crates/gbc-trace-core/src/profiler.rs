//! Execution counts per physical ROM bank.
//!
//! Each bank gets a fixed slab of 0x4000 slots, allocated the first time ROM
//! code runs. The switchable window is attributed through a cached bank id
//! that is only refreshed by [`Profiler::mapper_changed`]; a bank switch the
//! engine never reports keeps attributing to the previous bank.

use log::{debug, warn};

use crate::decode::Instruction;
use crate::engine::EngineView;
use crate::region::{Region, classify};

pub const BANK_SLOTS: usize = 0x4000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub instruction: Instruction,
    pub hits: u64,
}

/// Where an execution was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    pub bank: usize,
    pub offset: u16,
    pub hits: u64,
}

type BankTable = Box<[Option<ProfileRecord>]>;

#[derive(Debug, Default)]
pub struct Profiler {
    banks: Option<Vec<BankTable>>,
    bank1: Option<usize>,
    max_hits: u64,
    last_addr: Option<u16>,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one execution of `inst`. Returns `None` when the address is not
    /// cartridge ROM (boot overlay, RAM, ...) or no ROM is loaded yet.
    pub fn record_execution<E: EngineView + ?Sized>(
        &mut self,
        inst: &Instruction,
        engine: &E,
    ) -> Option<Attribution> {
        self.last_addr = Some(inst.addr);
        if classify(inst.addr, engine.boot_rom_mapped()) != Region::Rom {
            return None;
        }

        let (bank, offset) = if inst.addr < 0x4000 {
            (0, inst.addr)
        } else {
            (self.switchable_bank(engine), inst.addr - 0x4000)
        };

        let tables = self.tables(engine)?;
        let bank_count = tables.len();
        let Some(table) = tables.get_mut(bank) else {
            warn!("Switchable bank {bank} is outside the ROM ({bank_count} banks); not profiled");
            return None;
        };

        let hits = if let Some(record) = table[offset as usize].as_mut() {
            record.hits += 1;
            record.hits
        } else {
            if overlaps_recorded(table, offset as usize, inst.len()) {
                warn!(
                    "Instruction at bank {bank} offset {offset:04X} overlaps a recorded instruction"
                );
            }
            table[offset as usize] = Some(ProfileRecord {
                instruction: inst.clone(),
                hits: 1,
            });
            1
        };

        self.max_hits = self.max_hits.max(hits);
        Some(Attribution { bank, offset, hits })
    }

    /// Re-read the switchable bank after the engine reports a mapper write.
    pub fn mapper_changed<E: EngineView + ?Sized>(&mut self, engine: &E) -> usize {
        let bank = engine.switchable_bank();
        self.bank1 = Some(bank);
        bank
    }

    pub fn max_hits(&self) -> u64 {
        self.max_hits
    }

    /// Number of bank tables, zero until ROM code has been profiled.
    pub fn bank_count(&self) -> usize {
        self.banks.as_ref().map_or(0, Vec::len)
    }

    pub fn bank_table(&self, bank: usize) -> Option<&[Option<ProfileRecord>]> {
        self.banks.as_ref()?.get(bank).map(|t| &t[..])
    }

    pub fn record(&self, bank: usize, offset: u16) -> Option<&ProfileRecord> {
        self.bank_table(bank)?.get(offset as usize)?.as_ref()
    }

    /// Start address of the last instruction seen, profiled or not.
    pub fn last_addr(&self) -> Option<u16> {
        self.last_addr
    }

    pub fn current_bank(&self) -> Option<usize> {
        self.bank1
    }

    fn switchable_bank<E: EngineView + ?Sized>(&mut self, engine: &E) -> usize {
        *self.bank1.get_or_insert_with(|| {
            let bank = engine.switchable_bank();
            debug!("No mapper notification yet; using switchable bank {bank}");
            bank
        })
    }

    fn tables<E: EngineView + ?Sized>(&mut self, engine: &E) -> Option<&mut Vec<BankTable>> {
        if self.banks.is_none() {
            let count = engine.rom()?.bank_count();
            debug!("Allocating execution profile for {count} ROM banks");
            self.banks = Some(
                (0..count)
                    .map(|_| vec![None; BANK_SLOTS].into_boxed_slice())
                    .collect(),
            );
        }
        self.banks.as_mut()
    }
}

fn overlaps_recorded(table: &[Option<ProfileRecord>], offset: usize, len: usize) -> bool {
    let before = offset.saturating_sub(3)..offset;
    let covers_offset = before.into_iter().any(|o| {
        table[o]
            .as_ref()
            .is_some_and(|r| o + r.instruction.len() > offset)
    });
    let end = (offset + len).min(table.len());
    covers_offset || table[offset + 1..end.max(offset + 1)].iter().any(Option::is_some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Rom;
    use crate::engine::InstructionStep;
    use crate::opcode::{Mnemonic, OperandKind};

    struct Engine {
        rom: Option<Rom>,
        boot: bool,
        bank: usize,
    }

    impl Engine {
        fn with_banks(count: usize) -> Self {
            Self {
                rom: Some(Rom::from_bytes(vec![0; count * BANK_SLOTS]).unwrap()),
                boot: false,
                bank: 1,
            }
        }
    }

    impl EngineView for Engine {
        fn boot_rom_mapped(&self) -> bool {
            self.boot
        }

        fn rom(&self) -> Option<&Rom> {
            self.rom.as_ref()
        }

        fn switchable_bank(&self) -> usize {
            self.bank
        }
    }

    fn nop(addr: u16) -> Instruction {
        let step = InstructionStep::new(
            addr.wrapping_add(1),
            Mnemonic::Nop,
            OperandKind::None,
            OperandKind::None,
            &[0x00],
        );
        Instruction::from_step(&step)
    }

    fn jp(addr: u16) -> Instruction {
        let step = InstructionStep::new(
            addr.wrapping_add(3),
            Mnemonic::Jp,
            OperandKind::Word,
            OperandKind::None,
            &[0xC3, 0x50, 0x01],
        );
        Instruction::from_step(&step)
    }

    #[test]
    fn low_window_is_bank_zero() {
        let engine = Engine::with_banks(4);
        let mut p = Profiler::new();
        let a = p.record_execution(&nop(0x0150), &engine).unwrap();
        assert_eq!((a.bank, a.offset, a.hits), (0, 0x0150, 1));
        assert_eq!(p.bank_count(), 4);
    }

    #[test]
    fn switchable_window_uses_cached_bank() {
        let mut engine = Engine::with_banks(4);
        engine.bank = 2;
        let mut p = Profiler::new();

        let a = p.record_execution(&nop(0x4123), &engine).unwrap();
        assert_eq!((a.bank, a.offset), (2, 0x0123));

        // Un-notified switch keeps the stale bank.
        engine.bank = 3;
        let a = p.record_execution(&nop(0x4123), &engine).unwrap();
        assert_eq!((a.bank, a.hits), (2, 2));

        assert_eq!(p.mapper_changed(&engine), 3);
        let a = p.record_execution(&nop(0x4123), &engine).unwrap();
        assert_eq!((a.bank, a.hits), (3, 1));
    }

    #[test]
    fn counters_and_maximum() {
        let engine = Engine::with_banks(2);
        let mut p = Profiler::new();
        for _ in 0..5 {
            p.record_execution(&nop(0x0200), &engine);
        }
        for _ in 0..3 {
            p.record_execution(&nop(0x0201), &engine);
        }
        assert_eq!(p.record(0, 0x0200).unwrap().hits, 5);
        assert_eq!(p.record(0, 0x0201).unwrap().hits, 3);
        assert_eq!(p.max_hits(), 5);
    }

    #[test]
    fn non_rom_addresses_are_not_profiled() {
        let mut engine = Engine::with_banks(2);
        let mut p = Profiler::new();
        assert!(p.record_execution(&nop(0xC000), &engine).is_none());
        assert!(p.record_execution(&nop(0xFF80), &engine).is_none());
        assert_eq!(p.bank_count(), 0);
        assert_eq!(p.last_addr(), Some(0xFF80));

        engine.boot = true;
        assert!(p.record_execution(&nop(0x0000), &engine).is_none());
        assert!(p.record_execution(&nop(0x0300), &engine).is_none());
        assert!(p.record_execution(&nop(0x0150), &engine).is_some());
        assert!(p.record_execution(&nop(0x1000), &engine).is_some());
    }

    #[test]
    fn no_rom_means_no_tables() {
        let engine = Engine {
            rom: None,
            boot: false,
            bank: 1,
        };
        let mut p = Profiler::new();
        assert!(p.record_execution(&nop(0x0150), &engine).is_none());
        assert_eq!(p.bank_count(), 0);
        assert_eq!(p.max_hits(), 0);
    }

    #[test]
    fn out_of_range_bank_is_skipped() {
        let mut engine = Engine::with_banks(2);
        engine.bank = 9;
        let mut p = Profiler::new();
        assert!(p.record_execution(&nop(0x4000), &engine).is_none());
        assert_eq!(p.bank_count(), 2);
    }

    #[test]
    fn overlap_detection() {
        let engine = Engine::with_banks(1);
        let mut p = Profiler::new();
        p.record_execution(&jp(0x0100), &engine);
        let table = p.bank_table(0).unwrap();
        assert!(overlaps_recorded(table, 0x0101, 1));
        assert!(overlaps_recorded(table, 0x0102, 1));
        assert!(!overlaps_recorded(table, 0x0103, 1));
        assert!(overlaps_recorded(table, 0x00FF, 3));
        assert!(!overlaps_recorded(table, 0x00FD, 3));
    }
}
