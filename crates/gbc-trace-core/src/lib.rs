//! Debug instrumentation for a Game Boy Color emulation engine.
//!
//! This crate is a passive observer: the engine reports CPU steps, mapper
//! writes and memory accesses through the [`tracer`] hooks and exposes a
//! read-only [`engine::EngineView`]. Nothing here mutates emulator state.

/// Mnemonic and operand-kind tables in the engine's numbering.
pub mod opcode;

/// Step events and the engine accessors the tracer relies on.
pub mod engine;

/// Instruction records and their assembly text.
pub mod decode;

/// Static SM83 decoder over raw ROM bytes.
pub mod disasm;

/// Address-space regions and the memory-access filter mask.
pub mod region;

/// ROM image and cartridge header.
pub mod cartridge;

/// Per-bank execution counters.
pub mod profiler;

/// Execution report.
pub mod report;

/// Event filter and logger.
pub mod tracer;

pub mod error;

pub use cartridge::Rom;
pub use engine::{EngineView, InterruptKind, MemAccessKind, StepEvent};
pub use error::{RomError, TraceError};
pub use tracer::{TraceOptions, Tracer};
