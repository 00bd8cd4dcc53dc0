//! Instruction records built from engine step events, and their text form.

use std::fmt;

use crate::engine::{ExtraData, InstructionStep, MAX_INSTRUCTION_BYTES};
use crate::opcode::{Mnemonic, OperandGroup, OperandKind};

/// Payload attached to an operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extra {
    Byte(u8),
    Desp(i8),
    Word(u16),
    Branch { desp: i8, addr: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub extra: Option<Extra>,
}

impl Operand {
    fn from_candidates(kind: OperandKind, candidates: &ExtraData) -> Self {
        let extra = match kind.group() {
            OperandGroup::Bare => None,
            OperandGroup::Byte => Some(Extra::Byte(candidates.byte)),
            OperandGroup::Displacement => Some(Extra::Desp(candidates.desp)),
            OperandGroup::Word => Some(Extra::Word(candidates.addr_word)),
            OperandGroup::Branch => Some(Extra::Branch {
                desp: candidates.branch.desp,
                addr: candidates.branch.addr,
            }),
        };
        Self { kind, extra }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.kind.bare_name() {
            return f.write_str(name);
        }
        match (self.kind, self.extra) {
            (OperandKind::Byte, Some(Extra::Byte(b))) => write!(f, "{b:02X}H"),
            (OperandKind::IndByte, Some(Extra::Byte(b))) => write!(f, "({b:02X}H)"),
            (OperandKind::HighByte, Some(Extra::Byte(b))) => write!(f, "(FF{b:02X}H)"),
            (OperandKind::Desp, Some(Extra::Desp(d))) => write!(f, "{d}"),
            (OperandKind::SpDisp, Some(Extra::Desp(d))) => write!(f, "SP{d}"),
            (OperandKind::Addr, Some(Extra::Word(w))) => write!(f, "({w:04X}H)"),
            (OperandKind::Word, Some(Extra::Word(w))) => write!(f, "{w:04X}H"),
            (OperandKind::Branch, Some(Extra::Branch { desp, addr })) => {
                write!(f, "${desp:+} ({addr:04X}H)")
            }
            (OperandKind::Other(code), _) => write!(f, "?{code}"),
            _ => f.write_str("?"),
        }
    }
}

/// A decoded instruction, immutable once built from a step event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub addr: u16,
    pub mnemonic: Mnemonic,
    pub op1: Operand,
    pub op2: Operand,
    bytes: [u8; MAX_INSTRUCTION_BYTES],
    len: u8,
}

impl Instruction {
    pub fn from_step(step: &InstructionStep) -> Self {
        let raw = step.bytes();
        let mut bytes = [0u8; MAX_INSTRUCTION_BYTES];
        bytes[..raw.len()].copy_from_slice(raw);
        Self {
            addr: step.next_addr.wrapping_sub(raw.len() as u16),
            mnemonic: step.mnemonic,
            op1: Operand::from_candidates(step.op1, &step.extra[0]),
            op2: Operand::from_candidates(step.op2, &step.extra[1]),
            bytes,
            len: raw.len() as u8,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}   ", self.addr)?;
        for b in self.bytes() {
            write!(f, " {b:02x}")?;
        }
        for _ in self.bytes().len()..MAX_INSTRUCTION_BYTES {
            f.write_str("   ")?;
        }
        write!(f, "    {}", self.mnemonic)?;
        if self.op1.kind.is_present() {
            write!(f, " {}", self.op1)?;
        }
        if self.op2.kind.is_present() {
            write!(f, ", {}", self.op2)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(
        next: u16,
        mnemonic: Mnemonic,
        op1: OperandKind,
        op2: OperandKind,
        raw: &[u8],
    ) -> InstructionStep {
        InstructionStep::new(next, mnemonic, op1, op2, raw)
    }

    #[test]
    fn nop_renders_with_padded_columns() {
        let s = step(0x0151, Mnemonic::Nop, OperandKind::None, OperandKind::None, &[0x00]);
        let inst = Instruction::from_step(&s);
        assert_eq!(inst.addr, 0x0150);
        assert_eq!(inst.to_string(), "0150    00             NOP ");
    }

    #[test]
    fn start_address_wraps_below_zero() {
        let s = step(0x0001, Mnemonic::Ld, OperandKind::A, OperandKind::Byte, &[0x3E, 0x10])
            .with_extra(ExtraData::default(), ExtraData::byte(0x10));
        let inst = Instruction::from_step(&s);
        assert_eq!(inst.addr, 0xFFFF);
        assert_eq!(inst.to_string(), "FFFF    3e 10          LD   A, 10H");
    }

    #[test]
    fn payload_follows_operand_group() {
        let s = step(0xC003, Mnemonic::Ld, OperandKind::Addr, OperandKind::A, &[0xEA, 0x00, 0xC0])
            .with_extra(
                ExtraData {
                    byte: 0x11,
                    desp: -4,
                    addr_word: 0xC000,
                    ..ExtraData::default()
                },
                ExtraData::byte(0x99),
            );
        let inst = Instruction::from_step(&s);
        assert_eq!(inst.op1.extra, Some(Extra::Word(0xC000)));
        assert_eq!(inst.op2.extra, None);
        assert!(inst.to_string().ends_with("LD   (C000H), A"));
    }

    #[test]
    fn branch_shows_offset_and_target() {
        let s = step(0x0152, Mnemonic::Jr, OperandKind::CondNz, OperandKind::Branch, &[0x20, 0xFE])
            .with_extra(ExtraData::default(), ExtraData::branch(-2, 0x0150));
        let inst = Instruction::from_step(&s);
        assert!(inst.to_string().ends_with("JR   NZ, $-2 (0150H)"));
    }

    #[test]
    fn byte_pointer_forms() {
        let s = step(0x0202, Mnemonic::Ld, OperandKind::HighByte, OperandKind::A, &[0xE0, 0x40])
            .with_extra(ExtraData::byte(0x40), ExtraData::default());
        assert!(Instruction::from_step(&s).to_string().ends_with("LD   (FF40H), A"));

        let s = step(0x0202, Mnemonic::Ld, OperandKind::Hl, OperandKind::SpDisp, &[0xF8, 0x05])
            .with_extra(ExtraData::default(), ExtraData::desp(5));
        assert!(Instruction::from_step(&s).to_string().ends_with("LD   HL, SP5"));

        let s = step(0x0202, Mnemonic::Ld, OperandKind::Hl, OperandKind::SpDisp, &[0xF8, 0xFD])
            .with_extra(ExtraData::default(), ExtraData::desp(-3));
        assert!(Instruction::from_step(&s).to_string().ends_with("LD   HL, SP-3"));

        let s = step(0x0202, Mnemonic::Add, OperandKind::Sp, OperandKind::Desp, &[0xE8, 0xFD])
            .with_extra(ExtraData::default(), ExtraData::desp(-3));
        assert!(Instruction::from_step(&s).to_string().ends_with("ADD  SP, -3"));
    }

    #[test]
    fn unknown_codes_render_instead_of_failing() {
        let s = step(
            0x4001,
            Mnemonic::from(300),
            OperandKind::from(77),
            OperandKind::None,
            &[0xD3],
        );
        let text = Instruction::from_step(&s).to_string();
        assert!(text.contains("300"));
        assert!(text.contains("?77"));
    }
}
