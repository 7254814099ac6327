use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};

use crate::{
    config::DecodeConfig,
    decode::{AccessKind, LogEntry, decode},
    error::TraceError,
    layout::is_record,
};

/// All instruction records of a trace, in trace order.
///
/// Positions returned by the queries index into this sequence, so header and
/// blank lines do not count.
#[derive(Debug, Clone, Default)]
pub struct TraceIndex {
    entries: Vec<LogEntry>,
}

impl TraceIndex {
    pub fn load(path: impl AsRef<Path>, config: &DecodeConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Unable to open trace file {}", path.display()))?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .context("Failed to read line from trace")?;
        Self::from_lines(lines.iter().map(String::as_str), config)
            .with_context(|| format!("Unable to decode trace file {}", path.display()))
    }

    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a str>,
        config: &DecodeConfig,
    ) -> Result<Self, TraceError> {
        let mut entries = Vec::new();
        let mut skipped = 0;
        for (idx, line) in lines.into_iter().enumerate() {
            if !is_record(line, &config.header_marker) {
                skipped += 1;
                continue;
            }
            let line = line.trim_end();
            let entry = decode(line, config).map_err(|source| TraceError::Decode {
                line: idx + 1,
                text: line.to_string(),
                source,
            })?;
            entries.push(entry);
        }
        log::debug!(
            "decoded {} trace entries, skipped {} lines",
            entries.len(),
            skipped
        );
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&LogEntry> {
        self.entries.get(position)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Positions of entries touching `address`, optionally only of one kind.
    pub fn find(&self, address: u32, kind: Option<AccessKind>) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.accesses(address))
            .filter(|(_, entry)| kind.is_none() || entry.kind == kind)
            .map(|(position, _)| position)
            .collect()
    }

    pub fn find_access(&self, address: u32) -> Vec<usize> {
        self.find(address, None)
    }

    pub fn find_read(&self, address: u32) -> Vec<usize> {
        self.find(address, Some(AccessKind::Read))
    }

    pub fn find_write(&self, address: u32) -> Vec<usize> {
        self.find(address, Some(AccessKind::Write))
    }

    /// Original text of the entries at `positions`; unknown positions are skipped.
    pub fn lines<'a>(&'a self, positions: &'a [usize]) -> impl Iterator<Item = &'a str> + 'a {
        positions
            .iter()
            .filter_map(|&position| self.get(position))
            .map(|entry| entry.raw_text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::tests::trace_line;
    use crate::error::DecodeError;

    fn sample() -> Vec<String> {
        vec![
            "ARM9+ARM7 trace log".to_string(),
            trace_line("ldr r0, [r1, #0x4]", &[(1, 0x1000)]),
            trace_line("mov r2, r0", &[]),
            String::new(),
            trace_line("str r2, [r3]", &[(3, 0x1004)]),
            trace_line("stmia r4, {r0-r3}", &[(4, 0x0ff8)]),
            trace_line("ldrb r5, [r6, #0x2]", &[(6, 0x1004)]),
            "\r".to_string(),
        ]
    }

    fn build(lines: &[String]) -> TraceIndex {
        TraceIndex::from_lines(lines.iter().map(String::as_str), &DecodeConfig::default())
            .unwrap()
    }

    #[test]
    fn skips_headers_and_blank_lines() {
        let index = build(&sample());
        assert_eq!(index.len(), 5);
        assert!(index.get(1).unwrap().kind.is_none());
        assert!(index.get(5).is_none());
    }

    #[test]
    fn queries_by_kind() {
        let index = build(&sample());
        assert_eq!(index.find_access(0x1004), vec![0, 2, 3]);
        assert_eq!(index.find_read(0x1004), vec![0]);
        assert_eq!(index.find_write(0x1004), vec![2, 3]);
        assert_eq!(index.find_read(0x1006), vec![0, 4]);
        assert_eq!(index.find_access(0x2000), Vec::<usize>::new());
    }

    #[test]
    fn reads_and_writes_partition_accesses() {
        let index = build(&sample());
        for address in (0x0ff0..0x1010).step_by(1) {
            let all = index.find_access(address);
            let reads = index.find_read(address);
            let writes = index.find_write(address);
            assert!(reads.iter().all(|p| !writes.contains(p)));
            assert!(writes.iter().all(|p| all.contains(p)));
            assert_eq!(reads.len() + writes.len(), all.len());
        }
    }

    #[test]
    fn lines_returns_raw_text() {
        let lines = sample();
        let index = build(&lines);
        let found = index.find_write(0x1004);
        let text: Vec<&str> = index.lines(&found).collect();
        assert_eq!(text, vec![lines[4].as_str(), lines[5].as_str()]);
    }

    #[test]
    fn decode_failure_reports_source_line() {
        let mut lines = sample();
        lines.insert(2, trace_line("ldr r0, [r1, r2, rrx]", &[]));
        let err = TraceIndex::from_lines(lines.iter().map(String::as_str), &DecodeConfig::default())
            .unwrap_err();
        let TraceError::Decode { line, source, .. } = err;
        assert_eq!(line, 3);
        assert!(matches!(source, DecodeError::UnknownAddressing(_)));
    }

    #[test]
    fn custom_header_marker() {
        let config = DecodeConfig {
            header_marker: "THUMB".to_string(),
            ..DecodeConfig::default()
        };
        let lines = ["THUMB trace", "ARM9 trace"];
        let err = TraceIndex::from_lines(lines, &config).unwrap_err();
        assert!(matches!(
            err,
            TraceError::Decode {
                line: 2,
                source: DecodeError::MalformedLine(_),
                ..
            }
        ));
    }
}
