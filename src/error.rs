/// Failure to decode a single trace line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Line is too short or a required delimiter is missing
    #[error("Malformed trace line: {0}")]
    MalformedLine(String),
    /// Offset or shift literal is not a `#`-prefixed number
    #[error("Invalid asm integer literal: {0}")]
    InvalidLiteral(String),
    /// Load/store offset operand of an unrecognized shape
    #[error("Unknown memory access pattern: {0}")]
    UnknownAddressing(String),
    /// Block transfer that is neither increment nor decrement
    #[error("Unknown block addressing mode: {0}")]
    UnknownBlockMode(String),
    /// Register name outside the canonical table
    #[error("Unknown register name: {0}")]
    UnknownRegister(String),
}

/// Failure to build a [`TraceIndex`](crate::trace::TraceIndex).
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Trace line {line} could not be decoded: {text}")]
    Decode {
        line: usize,
        text: String,
        #[source]
        source: DecodeError,
    },
}
