use crate::layout::HEADER_MARKER;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Lines starting with this token are trace headers, not instructions
    pub header_marker: String,
    /// Legacy block transfer decoding: decrement modes
    /// step upwards and every `rA-rB` range counts as one register.
    pub legacy_block_addressing: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            header_marker: HEADER_MARKER.to_string(),
            legacy_block_addressing: false,
        }
    }
}

impl DecodeConfig {
    pub fn legacy() -> Self {
        Self {
            legacy_block_addressing: true,
            ..Self::default()
        }
    }
}
