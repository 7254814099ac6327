use std::fmt;

use crate::{
    config::DecodeConfig,
    error::DecodeError,
    layout::TraceLine,
    operand::{enclosed, parse_literal, split_operands},
    registers::{RegisterSnapshot, register_index},
};

/// Word granularity: the low two address bits are ignored.
pub const WORD_MASK: u32 = !0b11;
const HALFWORD_BITS: u32 = 0b10;
const BYTE_BITS: u32 = 0b11;
/// Distance between consecutive registers of a block transfer.
const BLOCK_STEP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => write!(f, "R"),
            AccessKind::Write => write!(f, "W"),
        }
    }
}

/// One decoded instruction of the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub raw_text: String,
    pub instruction_address: u32,
    pub instruction_word: u32,
    pub disassembly: String,
    pub registers: RegisterSnapshot,
    /// `None` for instructions that do not touch memory.
    pub kind: Option<AccessKind>,
    pub access_mask: u32,
    access_addresses: Vec<u32>,
}

impl LogEntry {
    pub fn is_read(&self) -> bool {
        self.kind == Some(AccessKind::Read)
    }

    pub fn is_write(&self) -> bool {
        self.kind == Some(AccessKind::Write)
    }

    /// Addresses touched by the instruction, already masked, in register order.
    pub fn access_addresses(&self) -> &[u32] {
        &self.access_addresses
    }

    pub fn accesses(&self, address: u32) -> bool {
        let address = address & self.access_mask;
        self.access_addresses.iter().any(|&a| a == address)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_text)
    }
}

struct MemoryAccess {
    kind: AccessKind,
    mask: u32,
    addresses: Vec<u32>,
}

pub fn decode(raw_line: &str, config: &DecodeConfig) -> Result<LogEntry, DecodeError> {
    let fields = TraceLine::read(raw_line)?;
    let registers = RegisterSnapshot::parse(fields.register_dump)?;
    let disasm = fields.disassembly.to_ascii_lowercase();

    let access = if disasm.starts_with("ldr") || disasm.starts_with("str") {
        Some(decode_single(&disasm, &registers)?)
    } else if disasm.starts_with("ldm") || disasm.starts_with("stm") {
        Some(decode_block(&disasm, &registers, config.legacy_block_addressing)?)
    } else {
        None
    };

    let (kind, access_mask, access_addresses) = match access {
        Some(access) => {
            log::trace!(
                "{:08x} {} {} {:08x?}",
                fields.address,
                disasm.trim_end(),
                access.kind,
                access.addresses
            );
            (Some(access.kind), access.mask, access.addresses)
        }
        None => (None, 0, Vec::new()),
    };

    Ok(LogEntry {
        raw_text: raw_line.to_string(),
        instruction_address: fields.address,
        instruction_word: fields.word,
        disassembly: fields.disassembly.to_string(),
        registers,
        kind,
        access_mask,
        access_addresses,
    })
}

/// `ldr`/`str` family: one base register plus an optional offset.
fn decode_single(disasm: &str, registers: &RegisterSnapshot) -> Result<MemoryAccess, DecodeError> {
    let kind = if disasm.starts_with("ldr") {
        AccessKind::Read
    } else {
        AccessKind::Write
    };

    // [r0], [r0, #-0x4], [r1, -r2], [r1, r0, lsl #2]
    let operands = split_operands(enclosed(disasm, '[', ']')?);
    let base = registers.value_of(operands[0])?;
    let unknown = || DecodeError::UnknownAddressing(disasm.trim_end().to_string());

    let offset = match operands.as_slice() {
        [_] => 0,
        [_, imm] if imm.starts_with('#') => parse_literal(imm)? as u32,
        [_, index, rest @ ..] => {
            let (negative, name) = match index.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, index.strip_prefix('+').unwrap_or(*index)),
            };
            let value = registers.value_of(name)?;
            let shifted = match rest {
                [] => value,
                [shift] if shift.starts_with("lsl") || shift.starts_with("asl") => {
                    value.checked_shl(shift_amount(shift)?).unwrap_or(0)
                }
                [shift] if shift.starts_with("lsr") || shift.starts_with("asr") => {
                    value.checked_shr(shift_amount(shift)?).unwrap_or(0)
                }
                _ => return Err(unknown()),
            };
            if negative {
                shifted.wrapping_neg()
            } else {
                shifted
            }
        }
        [] => return Err(unknown()),
    };

    let mask = match disasm.as_bytes().get(3) {
        Some(b'h') => WORD_MASK | HALFWORD_BITS,
        Some(b'b') => WORD_MASK | BYTE_BITS,
        _ => WORD_MASK,
    };

    Ok(MemoryAccess {
        kind,
        mask,
        addresses: vec![base.wrapping_add(offset) & mask],
    })
}

fn shift_amount(operand: &str) -> Result<u32, DecodeError> {
    let invalid = || DecodeError::InvalidLiteral(operand.to_string());
    let begin = operand.find('#').ok_or_else(invalid)?;
    u32::try_from(parse_literal(&operand[begin..])?).map_err(|_| invalid())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Increment,
    Decrement,
}

/// `ldm`/`stm` family: consecutive words, one per listed register.
fn decode_block(
    disasm: &str,
    registers: &RegisterSnapshot,
    legacy: bool,
) -> Result<MemoryAccess, DecodeError> {
    let malformed = || DecodeError::MalformedLine(disasm.trim_end().to_string());
    let kind = if disasm.starts_with('l') {
        AccessKind::Read
    } else {
        AccessKind::Write
    };

    let bytes = disasm.as_bytes();
    let direction = match bytes.get(3) {
        Some(b'i') => Direction::Increment,
        // Plain `ldm`/`stm` is increment-after.
        Some(b' ') => Direction::Increment,
        Some(b'd') => Direction::Decrement,
        _ => return Err(DecodeError::UnknownBlockMode(disasm.trim_end().to_string())),
    };
    let before = bytes.get(4) == Some(&b'b');

    let space = disasm.find(' ').ok_or_else(malformed)?;
    let comma = disasm.find(',').ok_or_else(malformed)?;
    let name = disasm.get(space + 1..comma).ok_or_else(malformed)?.trim();
    let (name, writeback) = match name.strip_suffix('!') {
        Some(name) => (name, true),
        None => (name, false),
    };
    let dumped = registers.value_of(name)? & WORD_MASK;

    let count = count_registers(disasm, legacy)?;
    let span = BLOCK_STEP.wrapping_mul(count);
    // The dump holds the base after write-back; undo it to get the base the
    // transfer started from.
    let base = match (writeback && !legacy, direction) {
        (false, _) => dumped,
        (true, Direction::Increment) => dumped.wrapping_sub(span),
        (true, Direction::Decrement) => dumped.wrapping_add(span),
    };
    let lowest = match (direction, before, legacy) {
        (_, false, true) | (Direction::Increment, false, false) => base,
        (_, true, true) | (Direction::Increment, true, false) => base.wrapping_add(BLOCK_STEP),
        (Direction::Decrement, false, false) => base.wrapping_sub(span).wrapping_add(BLOCK_STEP),
        (Direction::Decrement, true, false) => base.wrapping_sub(span),
    };

    let addresses = (0..count)
        .map(|i| lowest.wrapping_add(BLOCK_STEP.wrapping_mul(i)))
        .collect();

    Ok(MemoryAccess {
        kind,
        mask: WORD_MASK,
        addresses,
    })
}

/// Number of registers in a `{r4-r9,lr}` list. In legacy mode a range
/// always counts as a single register.
fn count_registers(disasm: &str, legacy: bool) -> Result<u32, DecodeError> {
    let list = enclosed(disasm, '{', '}')?;
    let mut total = 0;
    for group in split_operands(list) {
        let (first, last) = match group.split_once('-') {
            Some((first, last)) => (first, Some(last)),
            None => (group, None),
        };
        let start = register_index(first)
            .ok_or_else(|| DecodeError::UnknownRegister(first.to_string()))?;
        let end = match last {
            Some(last) if !legacy => register_index(last)
                .ok_or_else(|| DecodeError::UnknownRegister(last.to_string()))?,
            _ => start,
        };
        if end < start {
            return Err(DecodeError::MalformedLine(disasm.trim_end().to_string()));
        }
        total += (end - start + 1) as u32;
    }
    Ok(total)
}
