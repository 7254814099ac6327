//! Column layout of an emulator trace line.
//!
//! ```text
//! 02000a3c:  e5910004 ldr r0, [r1, #+0x4]                   r0:00000000 r1:02001000 ...
//! ^0         ^11      ^20                                  ^56
//! ```
//!
//! The instruction address and encoded word are 8 hex digits at fixed
//! columns, the disassembly is a space padded field of 36 characters and the
//! register dump follows as `name:value` pairs in canonical register order.

use crate::error::DecodeError;

pub const ADDRESS_COLUMN: usize = 0;
pub const WORD_COLUMN: usize = 11;
pub const HEX_FIELD_WIDTH: usize = 8;
pub const DISASM_COLUMN: usize = 20;
pub const DISASM_WIDTH: usize = 36;
pub const DISASM_END: usize = DISASM_COLUMN + DISASM_WIDTH;

/// Leading token of the header lines the emulator writes into a trace.
pub const HEADER_MARKER: &str = "ARM";

/// Lines this short or shorter are terminators, not instructions.
pub const MIN_LINE_LEN: usize = 2;

/// First character of the register dump.
const DUMP_START: char = 'r';

/// Borrowed view of the fixed fields of one trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLine<'a> {
    pub address: u32,
    pub word: u32,
    pub disassembly: &'a str,
    pub register_dump: &'a str,
}

impl<'a> TraceLine<'a> {
    pub fn read(line: &'a str) -> Result<Self, DecodeError> {
        let address = hex_field(line, ADDRESS_COLUMN)?;
        let word = hex_field(line, WORD_COLUMN)?;
        let disassembly = line
            .get(DISASM_COLUMN..DISASM_END)
            .ok_or_else(|| DecodeError::MalformedLine(line.to_string()))?;
        let dump_start = line[DISASM_END..]
            .find(DUMP_START)
            .map(|offset| DISASM_END + offset)
            .ok_or_else(|| DecodeError::MalformedLine(line.to_string()))?;
        Ok(Self {
            address,
            word,
            disassembly,
            register_dump: &line[dump_start..],
        })
    }
}

/// Whether a raw line carries an instruction record at all.
pub fn is_record(line: &str, header_marker: &str) -> bool {
    !line.starts_with(header_marker) && line.trim_end().len() > MIN_LINE_LEN
}

fn hex_field(line: &str, column: usize) -> Result<u32, DecodeError> {
    let field = line
        .get(column..column + HEX_FIELD_WIDTH)
        .ok_or_else(|| DecodeError::MalformedLine(line.to_string()))?;
    u32::from_str_radix(field, 16).map_err(|_| DecodeError::MalformedLine(line.to_string()))
}
