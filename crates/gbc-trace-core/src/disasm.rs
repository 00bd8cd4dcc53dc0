//! Static SM83 decoder producing the same step events a running engine
//! reports, so ROM images can be traced without executing them.

use crate::engine::{ExtraData, InstructionStep};
use crate::opcode::{Mnemonic, OperandKind};

type Decoded = (Mnemonic, OperandKind, OperandKind);

/// Decode the instruction at the start of `mem`. `addr` is its absolute
/// address, used for `next_addr` and relative jump targets. Bytes past the
/// end of `mem` read as zero.
pub fn decode_sm83(mem: &[u8], addr: u16) -> InstructionStep {
    let get = |offset: usize| -> u8 { mem.get(offset).copied().unwrap_or(0) };
    let op = get(0);

    let mut raw = vec![op];
    let (mnemonic, op1, op2) = if op == 0xCB {
        raw.push(get(1));
        decode_cb(get(1))
    } else {
        decode_base(op)
    };

    let mut extra = [ExtraData::default(); 2];
    for (slot, kind) in extra.iter_mut().zip([op1, op2]) {
        *slot = match kind {
            OperandKind::Byte | OperandKind::IndByte | OperandKind::HighByte => {
                let b = get(raw.len());
                raw.push(b);
                ExtraData::byte(b)
            }
            OperandKind::Desp | OperandKind::SpDisp => {
                let b = get(raw.len());
                raw.push(b);
                ExtraData::desp(b as i8)
            }
            OperandKind::Addr | OperandKind::Word => {
                let lo = get(raw.len());
                let hi = get(raw.len() + 1);
                raw.extend([lo, hi]);
                ExtraData::word(u16::from_le_bytes([lo, hi]))
            }
            OperandKind::Branch => {
                let e = get(raw.len()) as i8;
                raw.push(e as u8);
                let after = addr.wrapping_add(raw.len() as u16);
                ExtraData::branch(e, after.wrapping_add(e as u16))
            }
            _ => ExtraData::default(),
        };
    }

    let next_addr = addr.wrapping_add(raw.len() as u16);
    InstructionStep::new(next_addr, mnemonic, op1, op2, &raw).with_extra(extra[0], extra[1])
}

fn decode_base(op: u8) -> Decoded {
    use OperandKind as K;

    let x = op >> 6;
    let y = (op >> 3) & 0x07;
    let z = op & 0x07;
    let p = y >> 1;
    let q = y & 0x01;

    let r = K::reg8;

    let rp = |idx: u8| match idx {
        0 => K::Bc,
        1 => K::De,
        2 => K::Hl,
        _ => K::Sp,
    };

    let rp2 = |idx: u8| match idx {
        0 => K::Bc,
        1 => K::De,
        2 => K::Hl,
        _ => K::Af,
    };

    let alu = |idx: u8| match idx {
        0 => Mnemonic::Add,
        1 => Mnemonic::Adc,
        2 => Mnemonic::Sub,
        3 => Mnemonic::Sbc,
        4 => Mnemonic::And,
        5 => Mnemonic::Xor,
        6 => Mnemonic::Or,
        _ => Mnemonic::Cp,
    };

    const UNK: Decoded = (Mnemonic::Unk, OperandKind::None, OperandKind::None);
    let bare = |m: Mnemonic| (m, K::None, K::None);

    match x {
        0 => match z {
            0 => match y {
                0 => bare(Mnemonic::Nop),
                1 => (Mnemonic::Ld, K::Addr, K::Sp),
                2 => bare(Mnemonic::Stop),
                3 => (Mnemonic::Jr, K::Branch, K::None),
                _ => (Mnemonic::Jr, K::condition(y - 4), K::Branch),
            },
            1 if q == 0 => (Mnemonic::Ld, rp(p), K::Word),
            1 => (Mnemonic::Add, K::Hl, rp(p)),
            2 => {
                let (m, ptr) = match p {
                    0 => (Mnemonic::Ld, K::IndBc),
                    1 => (Mnemonic::Ld, K::IndDe),
                    2 => (Mnemonic::Ldi, K::IndHl),
                    _ => (Mnemonic::Ldd, K::IndHl),
                };
                if q == 0 { (m, ptr, K::A) } else { (m, K::A, ptr) }
            }
            3 if q == 0 => (Mnemonic::Inc, rp(p), K::None),
            3 => (Mnemonic::Dec, rp(p), K::None),
            4 => (Mnemonic::Inc, r(y), K::None),
            5 => (Mnemonic::Dec, r(y), K::None),
            6 => (Mnemonic::Ld, r(y), K::Byte),
            _ => bare(match y {
                0 => Mnemonic::Rlca,
                1 => Mnemonic::Rrca,
                2 => Mnemonic::Rla,
                3 => Mnemonic::Rra,
                4 => Mnemonic::Daa,
                5 => Mnemonic::Cpl,
                6 => Mnemonic::Scf,
                _ => Mnemonic::Ccf,
            }),
        },
        1 if op == 0x76 => bare(Mnemonic::Halt),
        1 => (Mnemonic::Ld, r(y), r(z)),
        2 => (alu(y), K::A, r(z)),
        _ => match z {
            0 => match y {
                0..=3 => (Mnemonic::Ret, K::condition(y), K::None),
                4 => (Mnemonic::Ld, K::HighByte, K::A),
                5 => (Mnemonic::Add, K::Sp, K::Desp),
                6 => (Mnemonic::Ld, K::A, K::HighByte),
                _ => (Mnemonic::Ld, K::Hl, K::SpDisp),
            },
            1 if q == 0 => (Mnemonic::Pop, rp2(p), K::None),
            1 => match p {
                0 => bare(Mnemonic::Ret),
                1 => bare(Mnemonic::Reti),
                2 => (Mnemonic::Jp, K::IndHl, K::None),
                _ => (Mnemonic::Ld, K::Sp, K::Hl),
            },
            2 => match y {
                0..=3 => (Mnemonic::Jp, K::condition(y), K::Word),
                4 => (Mnemonic::Ld, K::HighC, K::A),
                5 => (Mnemonic::Ld, K::Addr, K::A),
                6 => (Mnemonic::Ld, K::A, K::HighC),
                _ => (Mnemonic::Ld, K::A, K::Addr),
            },
            3 => match y {
                0 => (Mnemonic::Jp, K::Word, K::None),
                6 => bare(Mnemonic::Di),
                7 => bare(Mnemonic::Ei),
                _ => UNK,
            },
            4 if y < 4 => (Mnemonic::Call, K::condition(y), K::Word),
            5 if q == 0 => (Mnemonic::Push, rp2(p), K::None),
            5 if p == 0 => (Mnemonic::Call, K::Word, K::None),
            6 => (alu(y), K::A, K::Byte),
            7 => bare(Mnemonic::rst(y)),
            _ => UNK,
        },
    }
}

fn decode_cb(op: u8) -> Decoded {
    let x = op >> 6;
    let y = (op >> 3) & 0x07;
    let z = op & 0x07;
    let r = OperandKind::reg8(z);

    match x {
        0 => {
            let rot = match y {
                0 => Mnemonic::Rlc,
                1 => Mnemonic::Rrc,
                2 => Mnemonic::Rl,
                3 => Mnemonic::Rr,
                4 => Mnemonic::Sla,
                5 => Mnemonic::Sra,
                6 => Mnemonic::Swap,
                _ => Mnemonic::Srl,
            };
            (rot, r, OperandKind::None)
        }
        1 => (Mnemonic::Bit, OperandKind::bit(y), r),
        2 => (Mnemonic::Res, OperandKind::bit(y), r),
        _ => (Mnemonic::Set, OperandKind::bit(y), r),
    }
}
