//! Per-bank execution listing built from the profiler tables.

use std::io::{self, Write};

use log::warn;

use crate::profiler::{ProfileRecord, Profiler};

/// One step of a bank walk. Gaps are runs of never-executed offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    Gap(usize),
    Hit {
        offset: u16,
        /// Bytes of the bank this row covers. Only shorter than the
        /// instruction when it runs past the end of the bank.
        len: usize,
        record: &'a ProfileRecord,
    },
}

impl Row<'_> {
    pub fn span(&self) -> usize {
        match self {
            Row::Gap(n) => *n,
            Row::Hit { len, .. } => *len,
        }
    }
}

/// Walks a bank table front to back, stepping over recorded instructions by
/// their length.
pub struct BankWalk<'a> {
    table: &'a [Option<ProfileRecord>],
    pos: usize,
}

impl<'a> Iterator for BankWalk<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let slot = self.table.get(start)?;
        if let Some(record) = slot {
            let len = record.instruction.len().max(1).min(self.table.len() - start);
            self.pos += len;
            return Some(Row::Hit {
                offset: start as u16,
                len,
                record,
            });
        }
        let gap = self.table[start..]
            .iter()
            .take_while(|s| s.is_none())
            .count();
        self.pos += gap;
        Some(Row::Gap(gap))
    }
}

pub fn bank_walk(profiler: &Profiler, bank: usize) -> Option<BankWalk<'_>> {
    Some(BankWalk {
        table: profiler.bank_table(bank)?,
        pos: 0,
    })
}

fn decimal_digits(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Write every bank that has at least one executed instruction. Hit counts
/// are right-aligned to the widest printed count and bank ids zero-padded to
/// the width of the bank count. Records hidden inside an earlier instruction
/// are not printed and do not affect the widths.
pub fn write_report<W: Write + ?Sized>(profiler: &Profiler, out: &mut W) -> io::Result<()> {
    let banks: Vec<(usize, Vec<Row<'_>>)> = (0..profiler.bank_count())
        .filter_map(|bank| Some((bank, bank_walk(profiler, bank)?.collect::<Vec<_>>())))
        .filter(|(_, rows)| rows.iter().any(|r| matches!(r, Row::Hit { .. })))
        .collect();

    let printed_max = banks
        .iter()
        .flat_map(|(_, rows)| rows.iter())
        .filter_map(|r| match r {
            Row::Hit { record, .. } => Some(record.hits),
            Row::Gap(_) => None,
        })
        .max()
        .unwrap_or(0);
    let hits_width = decimal_digits(printed_max);
    let bank_width = decimal_digits(profiler.bank_count() as u64);

    for (bank, rows) in banks {
        let populated = profiler
            .bank_table(bank)
            .map_or(0, |t| t.iter().filter(|s| s.is_some()).count());
        let shown = rows.iter().filter(|r| matches!(r, Row::Hit { .. })).count();
        if populated > shown {
            warn!(
                "Bank {bank}: {} recorded instructions start inside another and are not listed",
                populated - shown
            );
        }

        writeln!(out)?;
        writeln!(out, "## BANK {bank} ##")?;
        let mut in_run = false;
        for row in rows {
            match row {
                Row::Hit { record, .. } => {
                    writeln!(
                        out,
                        "[{:>hits_width$}] {:0bank_width$}:{}",
                        record.hits, bank, record.instruction
                    )?;
                    in_run = true;
                }
                Row::Gap(_) => {
                    if in_run {
                        writeln!(out)?;
                    }
                    in_run = false;
                }
            }
        }
    }
    Ok(())
}
