//! Mnemonic and operand-kind tables shared with the emulation engine.
//!
//! Both enums follow the engine's numbering so raw codes coming across the
//! step callback map directly onto them. Codes the table does not know yet are
//! carried as `Other(code)` instead of being rejected.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Unk,
    Ld,
    Push,
    Pop,
    Ldi,
    Ldd,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
    Inc,
    Dec,
    Daa,
    Cpl,
    Ccf,
    Scf,
    Nop,
    Halt,
    Di,
    Ei,
    Rlca,
    Rla,
    Rrca,
    Rra,
    Rlc,
    Rl,
    Rrc,
    Rr,
    Sla,
    Sra,
    Srl,
    Rld,
    Rrd,
    Bit,
    Set,
    Res,
    Jp,
    Jr,
    Call,
    Ret,
    Reti,
    Rst00,
    Rst08,
    Rst10,
    Rst18,
    Rst20,
    Rst28,
    Rst30,
    Rst38,
    Stop,
    Swap,
    Other(u16),
}

const MNEMONICS: [Mnemonic; 55] = [
    Mnemonic::Unk,
    Mnemonic::Ld,
    Mnemonic::Push,
    Mnemonic::Pop,
    Mnemonic::Ldi,
    Mnemonic::Ldd,
    Mnemonic::Add,
    Mnemonic::Adc,
    Mnemonic::Sub,
    Mnemonic::Sbc,
    Mnemonic::And,
    Mnemonic::Or,
    Mnemonic::Xor,
    Mnemonic::Cp,
    Mnemonic::Inc,
    Mnemonic::Dec,
    Mnemonic::Daa,
    Mnemonic::Cpl,
    Mnemonic::Ccf,
    Mnemonic::Scf,
    Mnemonic::Nop,
    Mnemonic::Halt,
    Mnemonic::Di,
    Mnemonic::Ei,
    Mnemonic::Rlca,
    Mnemonic::Rla,
    Mnemonic::Rrca,
    Mnemonic::Rra,
    Mnemonic::Rlc,
    Mnemonic::Rl,
    Mnemonic::Rrc,
    Mnemonic::Rr,
    Mnemonic::Sla,
    Mnemonic::Sra,
    Mnemonic::Srl,
    Mnemonic::Rld,
    Mnemonic::Rrd,
    Mnemonic::Bit,
    Mnemonic::Set,
    Mnemonic::Res,
    Mnemonic::Jp,
    Mnemonic::Jr,
    Mnemonic::Call,
    Mnemonic::Ret,
    Mnemonic::Reti,
    Mnemonic::Rst00,
    Mnemonic::Rst08,
    Mnemonic::Rst10,
    Mnemonic::Rst18,
    Mnemonic::Rst20,
    Mnemonic::Rst28,
    Mnemonic::Rst30,
    Mnemonic::Rst38,
    Mnemonic::Stop,
    Mnemonic::Swap,
];

impl From<u16> for Mnemonic {
    fn from(code: u16) -> Self {
        MNEMONICS
            .get(code as usize)
            .copied()
            .unwrap_or(Mnemonic::Other(code))
    }
}

impl Mnemonic {
    /// Text for the mnemonic column. Plain mnemonics are padded to four
    /// characters; the restart forms carry their vector.
    pub fn column_text(self) -> Option<&'static str> {
        let s = match self {
            Self::Unk => "UNK ",
            Self::Ld => "LD  ",
            Self::Push => "PUSH",
            Self::Pop => "POP ",
            Self::Ldi => "LDI ",
            Self::Ldd => "LDD ",
            Self::Add => "ADD ",
            Self::Adc => "ADC ",
            Self::Sub => "SUB ",
            Self::Sbc => "SBC ",
            Self::And => "AND ",
            Self::Or => "OR  ",
            Self::Xor => "XOR ",
            Self::Cp => "CP  ",
            Self::Inc => "INC ",
            Self::Dec => "DEC ",
            Self::Daa => "DAA ",
            Self::Cpl => "CPL ",
            Self::Ccf => "CCF ",
            Self::Scf => "SCF ",
            Self::Nop => "NOP ",
            Self::Halt => "HALT",
            Self::Di => "DI  ",
            Self::Ei => "EI  ",
            Self::Rlca => "RLCA",
            Self::Rla => "RLA ",
            Self::Rrca => "RRCA",
            Self::Rra => "RRA ",
            Self::Rlc => "RLC ",
            Self::Rl => "RL  ",
            Self::Rrc => "RRC ",
            Self::Rr => "RR  ",
            Self::Sla => "SLA ",
            Self::Sra => "SRA ",
            Self::Srl => "SRL ",
            Self::Rld => "RLD ",
            Self::Rrd => "RRD ",
            Self::Bit => "BIT ",
            Self::Set => "SET ",
            Self::Res => "RES ",
            Self::Jp => "JP  ",
            Self::Jr => "JR  ",
            Self::Call => "CALL",
            Self::Ret => "RET ",
            Self::Reti => "RETI",
            Self::Rst00 => "RST  00H",
            Self::Rst08 => "RST  08H",
            Self::Rst10 => "RST  10H",
            Self::Rst18 => "RST  18H",
            Self::Rst20 => "RST  20H",
            Self::Rst28 => "RST  28H",
            Self::Rst30 => "RST  30H",
            Self::Rst38 => "RST  38H",
            Self::Stop => "STOP",
            Self::Swap => "SWAP",
            Self::Other(_) => return None,
        };
        Some(s)
    }

    /// Restart instruction for vector `y * 8`.
    pub fn rst(y: u8) -> Self {
        match y & 0x07 {
            0 => Self::Rst00,
            1 => Self::Rst08,
            2 => Self::Rst10,
            3 => Self::Rst18,
            4 => Self::Rst20,
            5 => Self::Rst28,
            6 => Self::Rst30,
            _ => Self::Rst38,
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.column_text(), self) {
            (Some(s), _) => f.write_str(s),
            (None, Self::Other(code)) => write!(f, "{code:<4}"),
            (None, _) => f.write_str("????"),
        }
    }
}

/// Addressing mode of one operand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    None,
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    Byte,
    Desp,
    SpDisp,
    IndHl,
    IndBc,
    IndDe,
    Addr,
    Bc,
    De,
    Hl,
    Sp,
    Af,
    Bit0,
    Bit1,
    Bit2,
    Bit3,
    Bit4,
    Bit5,
    Bit6,
    Bit7,
    Word,
    CondNz,
    CondZ,
    CondNc,
    CondC,
    Branch,
    IndB,
    IndC,
    IndD,
    IndE,
    IndH,
    IndL,
    IndA,
    IndByte,
    HighByte,
    HighC,
    Other(u16),
}

const OPERAND_KINDS: [OperandKind; 44] = [
    OperandKind::None,
    OperandKind::A,
    OperandKind::B,
    OperandKind::C,
    OperandKind::D,
    OperandKind::E,
    OperandKind::H,
    OperandKind::L,
    OperandKind::Byte,
    OperandKind::Desp,
    OperandKind::SpDisp,
    OperandKind::IndHl,
    OperandKind::IndBc,
    OperandKind::IndDe,
    OperandKind::Addr,
    OperandKind::Bc,
    OperandKind::De,
    OperandKind::Hl,
    OperandKind::Sp,
    OperandKind::Af,
    OperandKind::Bit0,
    OperandKind::Bit1,
    OperandKind::Bit2,
    OperandKind::Bit3,
    OperandKind::Bit4,
    OperandKind::Bit5,
    OperandKind::Bit6,
    OperandKind::Bit7,
    OperandKind::Word,
    OperandKind::CondNz,
    OperandKind::CondZ,
    OperandKind::CondNc,
    OperandKind::CondC,
    OperandKind::Branch,
    OperandKind::IndB,
    OperandKind::IndC,
    OperandKind::IndD,
    OperandKind::IndE,
    OperandKind::IndH,
    OperandKind::IndL,
    OperandKind::IndA,
    OperandKind::IndByte,
    OperandKind::HighByte,
    OperandKind::HighC,
];

impl From<u16> for OperandKind {
    fn from(code: u16) -> Self {
        OPERAND_KINDS
            .get(code as usize)
            .copied()
            .unwrap_or(OperandKind::Other(code))
    }
}

/// Which extra payload, if any, an operand kind consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandGroup {
    Bare,
    Byte,
    Displacement,
    Word,
    Branch,
}

impl OperandKind {
    pub fn group(self) -> OperandGroup {
        match self {
            Self::Byte | Self::IndByte | Self::HighByte => OperandGroup::Byte,
            Self::Desp | Self::SpDisp => OperandGroup::Displacement,
            Self::Addr | Self::Word => OperandGroup::Word,
            Self::Branch => OperandGroup::Branch,
            _ => OperandGroup::Bare,
        }
    }

    pub fn is_present(self) -> bool {
        self != Self::None
    }

    /// Fixed rendering for kinds that carry no payload.
    pub fn bare_name(self) -> Option<&'static str> {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::H => "H",
            Self::L => "L",
            Self::IndHl => "(HL)",
            Self::IndBc => "(BC)",
            Self::IndDe => "(DE)",
            Self::Bc => "BC",
            Self::De => "DE",
            Self::Hl => "HL",
            Self::Sp => "SP",
            Self::Af => "AF",
            Self::Bit0 => "0",
            Self::Bit1 => "1",
            Self::Bit2 => "2",
            Self::Bit3 => "3",
            Self::Bit4 => "4",
            Self::Bit5 => "5",
            Self::Bit6 => "6",
            Self::Bit7 => "7",
            Self::CondNz => "NZ",
            Self::CondZ => "Z",
            Self::CondNc => "NC",
            Self::CondC => "C",
            Self::IndB => "(B)",
            Self::IndC => "(C)",
            Self::IndD => "(D)",
            Self::IndE => "(E)",
            Self::IndH => "(H)",
            Self::IndL => "(L)",
            Self::IndA => "(A)",
            Self::HighC => "(FF00H+C)",
            _ => return None,
        };
        Some(s)
    }

    /// 8-bit register operand by its SM83 encoding index (B C D E H L (HL) A).
    pub fn reg8(idx: u8) -> Self {
        match idx & 0x07 {
            0 => Self::B,
            1 => Self::C,
            2 => Self::D,
            3 => Self::E,
            4 => Self::H,
            5 => Self::L,
            6 => Self::IndHl,
            _ => Self::A,
        }
    }

    pub fn bit(idx: u8) -> Self {
        match idx & 0x07 {
            0 => Self::Bit0,
            1 => Self::Bit1,
            2 => Self::Bit2,
            3 => Self::Bit3,
            4 => Self::Bit4,
            5 => Self::Bit5,
            6 => Self::Bit6,
            _ => Self::Bit7,
        }
    }

    pub fn condition(idx: u8) -> Self {
        match idx & 0x03 {
            0 => Self::CondNz,
            1 => Self::CondZ,
            2 => Self::CondNc,
            _ => Self::CondC,
        }
    }
}
