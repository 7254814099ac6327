use crate::error::DecodeError;

pub const REGISTER_COUNT: usize = 16;

/// Canonical order of the register dump in every trace line.
pub const REGISTER_NAMES: [&str; REGISTER_COUNT] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "sp", "lr",
    "pc",
];

const ALIASES: [(&str, usize); 7] = [
    ("sb", 9),
    ("sl", 10),
    ("fp", 11),
    ("ip", 12),
    ("r13", 13),
    ("r14", 14),
    ("r15", 15),
];

/// Position of `name` in [`REGISTER_NAMES`], case-insensitive.
pub fn register_index(name: &str) -> Option<usize> {
    let name = name.trim().to_ascii_lowercase();
    REGISTER_NAMES
        .iter()
        .position(|&n| n == name)
        .or_else(|| ALIASES.iter().find(|(a, _)| *a == name).map(|&(_, i)| i))
}

/// Register values after the instruction executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterSnapshot {
    values: [u32; REGISTER_COUNT],
}

impl RegisterSnapshot {
    /// Reads `name:xxxxxxxx` pairs positionally. The names themselves are not
    /// checked, the dump is trusted to follow the canonical order.
    pub fn parse(dump: &str) -> Result<Self, DecodeError> {
        let mut values = [0u32; REGISTER_COUNT];
        let mut found = 0;
        for (colon, _) in dump.match_indices(':') {
            if found == REGISTER_COUNT {
                log::debug!("ignoring trailing register dump fields: {}", &dump[colon..]);
                break;
            }
            let value = dump
                .get(colon + 1..colon + 9)
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .ok_or_else(|| DecodeError::MalformedLine(dump.to_string()))?;
            values[found] = value;
            found += 1;
        }
        if found < REGISTER_COUNT {
            return Err(DecodeError::MalformedLine(dump.to_string()));
        }
        Ok(Self { values })
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.values.get(index).copied()
    }

    pub fn value_of(&self, name: &str) -> Result<u32, DecodeError> {
        register_index(name)
            .map(|index| self.values[index])
            .ok_or_else(|| DecodeError::UnknownRegister(name.to_string()))
    }
}
