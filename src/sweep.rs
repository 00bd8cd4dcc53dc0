//! Drives the tracer over a ROM without executing it: instructions are
//! decoded in address order and reported as if the CPU had run them.

use std::io::Write;

use gbc_trace_core::disasm::decode_sm83;
use gbc_trace_core::engine::MAX_INSTRUCTION_BYTES;
use gbc_trace_core::{EngineView, MemAccessKind, Rom, StepEvent, TraceError, Tracer};
use log::debug;

/// ROM with one bank mapped at 0x4000 and no boot ROM overlay.
pub struct Sweep {
    rom: Rom,
    bank: usize,
}

impl Sweep {
    pub fn new(rom: Rom) -> Self {
        Self { rom, bank: 1 }
    }

    pub fn select_bank(&mut self, bank: usize) {
        self.bank = bank;
    }

    /// Byte visible at `addr` in the current mapping. `None` outside ROM or
    /// past the end of the image.
    pub fn read(&self, addr: u16) -> Option<u8> {
        let (bank, offset) = match addr {
            0x0000..=0x3FFF => (0, addr as usize),
            0x4000..=0x7FFF => (self.bank, addr as usize - 0x4000),
            _ => return None,
        };
        self.rom.bank(bank)?.get(offset).copied()
    }

    fn fetch(&self, addr: u16) -> [u8; MAX_INSTRUCTION_BYTES] {
        let mut buf = [0u8; MAX_INSTRUCTION_BYTES];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.read(addr.wrapping_add(i as u16)).unwrap_or(0);
        }
        buf
    }

    /// Decode and report up to `count` instructions starting at `start`.
    /// Stops early when decoding leaves the ROM windows. Returns the number of
    /// instructions reported.
    pub fn run<W: Write>(
        &self,
        tracer: &mut Tracer<W>,
        start: u16,
        count: usize,
    ) -> Result<usize, TraceError> {
        let mut addr = start;
        for done in 0..count {
            if self.read(addr).is_none() {
                debug!("Sweep left ROM at {addr:04X}");
                return Ok(done);
            }
            let step = decode_sm83(&self.fetch(addr), addr);
            let len = step.bytes().len() as u16;
            if (1..len).any(|i| self.read(addr.wrapping_add(i)).is_none()) {
                debug!("Instruction at {addr:04X} runs past the end of ROM");
                return Ok(done);
            }
            for (i, &b) in step.bytes().iter().enumerate() {
                tracer.log_memory_access(self, MemAccessKind::Read, addr.wrapping_add(i as u16), b)?;
            }
            let next = step.next_addr;
            tracer.cpu_step(self, &StepEvent::Instruction(step))?;
            if next <= addr {
                return Ok(done + 1);
            }
            addr = next;
        }
        Ok(count)
    }
}

impl EngineView for Sweep {
    fn boot_rom_mapped(&self) -> bool {
        false
    }

    fn rom(&self) -> Option<&Rom> {
        Some(&self.rom)
    }

    fn switchable_bank(&self) -> usize {
        self.bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbc_trace_core::TraceOptions;
    use gbc_trace_core::region::{Region, RegionMask};

    fn rom() -> Rom {
        let mut data = vec![0u8; 0x10000];
        data[0x0100..0x0104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
        data[0x8000..0x8002].copy_from_slice(&[0x3E, 0x07]);
        data[0x7FFF] = 0xC9;
        Rom::from_bytes(data).unwrap()
    }

    #[test]
    fn reads_follow_mapping() {
        let mut sweep = Sweep::new(rom());
        assert_eq!(sweep.read(0x0102), Some(0x50));
        assert_eq!(sweep.read(0x4000), Some(0x00));
        sweep.select_bank(2);
        assert_eq!(sweep.read(0x4000), Some(0x3E));
        assert_eq!(sweep.read(0x8000), None);
        sweep.select_bank(9);
        assert_eq!(sweep.read(0x4000), None);
    }

    #[test]
    fn run_traces_and_profiles() {
        let sweep = Sweep::new(rom());
        let options = TraceOptions {
            print_instructions: true,
            ..TraceOptions::default()
        };
        let mut tracer = Tracer::new(options, Vec::new());
        assert_eq!(sweep.run(&mut tracer, 0x0100, 2).unwrap(), 2);
        assert_eq!(tracer.profiler().record(0, 0x0101).unwrap().hits, 1);

        let text = String::from_utf8(tracer.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().ends_with("JP   0150H"));
    }

    #[test]
    fn run_stops_at_end_of_rom_window() {
        let mut sweep = Sweep::new(rom());
        sweep.select_bank(1);
        let options = TraceOptions {
            mem_regions: Region::Rom.into(),
            ..TraceOptions::default()
        };
        let mut tracer = Tracer::new(options, Vec::new());
        assert_eq!(sweep.run(&mut tracer, 0x7FFF, 10).unwrap(), 1);
        assert_eq!(
            String::from_utf8(tracer.into_inner()).unwrap(),
            "MEM[7FFF] -> C9\n"
        );
    }

    #[test]
    fn operands_past_rom_window_stop_the_sweep() {
        let mut data = vec![0u8; 0x8000];
        data[0x7FFE..0x8000].copy_from_slice(&[0xCD, 0x34]);
        let sweep = Sweep::new(Rom::from_bytes(data).unwrap());
        let options = TraceOptions {
            print_instructions: true,
            mem_regions: RegionMask::ALL,
            ..TraceOptions::default()
        };
        let mut tracer = Tracer::new(options, Vec::new());

        assert_eq!(sweep.run(&mut tracer, 0x7FFE, 1).unwrap(), 0);
        assert!(tracer.profiler().record(1, 0x3FFE).is_none());
        assert!(tracer.get_ref().is_empty());
    }
}
