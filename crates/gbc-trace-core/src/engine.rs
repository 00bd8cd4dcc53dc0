//! What the emulation engine hands to the tracer, and what it lets the tracer
//! read back.

use crate::cartridge::Rom;
use crate::opcode::{Mnemonic, OperandKind};

/// Longest SM83 encoding (CB-prefixed forms and 16-bit immediates are 2-3).
pub const MAX_INSTRUCTION_BYTES: usize = 4;

/// Relative jump payload as decoded by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchTarget {
    pub desp: i8,
    pub addr: u16,
}

/// Extra-data candidates for one operand slot. Only the member matching the
/// slot's operand group is meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraData {
    pub byte: u8,
    pub desp: i8,
    pub addr_word: u16,
    pub branch: BranchTarget,
}

impl ExtraData {
    pub fn byte(value: u8) -> Self {
        Self {
            byte: value,
            ..Self::default()
        }
    }

    pub fn desp(value: i8) -> Self {
        Self {
            desp: value,
            ..Self::default()
        }
    }

    pub fn word(value: u16) -> Self {
        Self {
            addr_word: value,
            ..Self::default()
        }
    }

    pub fn branch(desp: i8, addr: u16) -> Self {
        Self {
            branch: BranchTarget { desp, addr },
            ..Self::default()
        }
    }
}

/// Payload of a decoded-instruction step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionStep {
    /// Program counter after the instruction bytes were fetched.
    pub next_addr: u16,
    pub mnemonic: Mnemonic,
    pub op1: OperandKind,
    pub op2: OperandKind,
    pub extra: [ExtraData; 2],
    bytes: [u8; MAX_INSTRUCTION_BYTES],
    len: u8,
}

impl InstructionStep {
    /// Bytes beyond [`MAX_INSTRUCTION_BYTES`] are dropped.
    pub fn new(
        next_addr: u16,
        mnemonic: Mnemonic,
        op1: OperandKind,
        op2: OperandKind,
        raw: &[u8],
    ) -> Self {
        let len = raw.len().min(MAX_INSTRUCTION_BYTES);
        let mut bytes = [0u8; MAX_INSTRUCTION_BYTES];
        bytes[..len].copy_from_slice(&raw[..len]);
        Self {
            next_addr,
            mnemonic,
            op1,
            op2,
            extra: [ExtraData::default(); 2],
            bytes,
            len: len as u8,
        }
    }

    pub fn with_extra(mut self, e1: ExtraData, e2: ExtraData) -> Self {
        self.extra = [e1, e2];
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl InterruptKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::VBlank => "V-Blank INT",
            Self::LcdStat => "LCD STAT INT",
            Self::Timer => "Timer INT",
            Self::Serial => "Serial INT",
            Self::Joypad => "Joypad INT",
        }
    }
}

/// One CPU step as reported by the engine. Interrupt dispatches never carry
/// an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
    Instruction(InstructionStep),
    Interrupt(InterruptKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccessKind {
    Read,
    Write,
}

/// Read-only view of engine state needed for attribution and filtering.
pub trait EngineView {
    /// Whether the boot ROM currently overlays the low address space.
    fn boot_rom_mapped(&self) -> bool;

    /// Loaded cartridge ROM, if any.
    fn rom(&self) -> Option<&Rom>;

    /// Physical bank currently visible at 0x4000-0x7FFF.
    fn switchable_bank(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_keeps_at_most_four_bytes() {
        let step = InstructionStep::new(
            0x0105,
            Mnemonic::Nop,
            OperandKind::None,
            OperandKind::None,
            &[1, 2, 3, 4, 5],
        );
        assert_eq!(step.bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn interrupt_tags() {
        assert_eq!(InterruptKind::VBlank.tag(), "V-Blank INT");
        assert_eq!(InterruptKind::LcdStat.tag(), "LCD STAT INT");
        assert_eq!(InterruptKind::Joypad.tag(), "Joypad INT");
    }
}
