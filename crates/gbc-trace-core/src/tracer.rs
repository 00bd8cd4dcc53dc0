//! Event sink wired into the engine's debug hooks.
//!
//! The tracer prints executed instructions, interrupt dispatches, mapper
//! changes and filtered memory accesses to a writer, and feeds every executed
//! instruction to the [`Profiler`].

use std::io::Write;

use log::trace;

use crate::decode::Instruction;
use crate::engine::{EngineView, InterruptKind, MemAccessKind, StepEvent};
use crate::error::TraceError;
use crate::profiler::Profiler;
use crate::region::{RegionMask, classify};
use crate::report;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceOptions {
    pub print_instructions: bool,
    pub print_mapper_changes: bool,
    /// Regions whose memory accesses are printed. Empty disables the filter
    /// output entirely.
    pub mem_regions: RegionMask,
}

pub struct Tracer<W: Write> {
    options: TraceOptions,
    profiler: Profiler,
    out: W,
}

impl<W: Write> Tracer<W> {
    pub fn new(options: TraceOptions, out: W) -> Self {
        Self {
            options,
            profiler: Profiler::new(),
            out,
        }
    }

    pub fn options(&self) -> &TraceOptions {
        &self.options
    }

    /// Options may change between steps; the profile is kept.
    pub fn set_options(&mut self, options: TraceOptions) {
        self.options = options;
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Handle one CPU step. Instructions are always profiled, and printed
    /// only when enabled. Interrupt dispatches are printed unconditionally.
    pub fn cpu_step<E: EngineView + ?Sized>(
        &mut self,
        engine: &E,
        event: &StepEvent,
    ) -> Result<(), TraceError> {
        match event {
            StepEvent::Interrupt(kind) => self.log_interrupt(*kind),
            StepEvent::Instruction(step) => {
                let inst = Instruction::from_step(step);
                if let Some(hit) = self.profiler.record_execution(&inst, engine) {
                    trace!(
                        "bank {} offset {:04X} executed {} times",
                        hit.bank, hit.offset, hit.hits
                    );
                }
                if self.options.print_instructions {
                    writeln!(self.out, "{inst}")?;
                }
                Ok(())
            }
        }
    }

    pub fn log_interrupt(&mut self, kind: InterruptKind) -> Result<(), TraceError> {
        writeln!(self.out, "{}", kind.tag())?;
        Ok(())
    }

    /// The engine wrote to the mapper. Refreshes the profiler's cached bank
    /// even when printing is off.
    pub fn mapper_changed<E: EngineView + ?Sized>(&mut self, engine: &E) -> Result<(), TraceError> {
        let bank = self.profiler.mapper_changed(engine);
        if self.options.print_mapper_changes {
            writeln!(self.out, "BANK1: {bank}")?;
        }
        Ok(())
    }

    pub fn log_memory_access<E: EngineView + ?Sized>(
        &mut self,
        engine: &E,
        kind: MemAccessKind,
        addr: u16,
        data: u8,
    ) -> Result<(), TraceError> {
        let mask = self.options.mem_regions;
        if mask.is_empty() || !mask.contains(classify(addr, engine.boot_rom_mapped())) {
            return Ok(());
        }
        match kind {
            MemAccessKind::Read => writeln!(self.out, "MEM[{addr:04X}] -> {data:02X}")?,
            MemAccessKind::Write => writeln!(self.out, "MEM[{addr:04X}]= {data:02X}")?,
        }
        Ok(())
    }

    /// Write the execution report collected so far.
    pub fn dump(&mut self) -> Result<(), TraceError> {
        report::write_report(&self.profiler, &mut self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
