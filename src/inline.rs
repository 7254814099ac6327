//! Inlines `dofile "name.lua"` directives into a single Lua script, so the
//! emulator can load one file instead of a directory of modules.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};

pub const DEFAULT_INPUT: &str = "MKDS Info Main.lua";
pub const DEFAULT_OUTPUT: &str = "MKDS Info.lua";

const DIRECTIVE: &str = "dofile";
/// Lines of an inlined file starting with this are dropped.
const DOC_PREFIX: &str = "--- ";

/// Replaces every `dofile` line of `source` with the loaded file wrapped in a
/// local function that is called immediately.
pub fn inline_includes(
    source: &str,
    mut load: impl FnMut(&str) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        if !line.trim().starts_with(DIRECTIVE) {
            out.push_str(line);
            continue;
        }
        let (Some(start), Some(end)) = (line.find('"'), line.rfind('"')) else {
            bail!("Invalid dofile syntax in line: {}", line.trim_end());
        };
        let name = line.get(start + 1..end).unwrap_or_default();
        let contents = load(name)?;

        out.push_str("local function _()\n");
        for included in contents.split_inclusive('\n') {
            if !included.starts_with(DOC_PREFIX) {
                out.push_str(included);
            }
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("end\n");
        out.push_str("_()\n");
    }
    Ok(out)
}

/// Reads `input`, inlines its includes from the filesystem and writes `output`.
/// Include names are resolved relative to the working directory.
pub fn inline_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let source = fs::read_to_string(input)
        .with_context(|| format!("Unable to read script {}", input.display()))?;
    let inlined = inline_includes(&source, |name| {
        let path = PathBuf::from(name);
        if !path.is_file() {
            bail!("File not found: {name}");
        }
        log::debug!("inlining {}", path.display());
        fs::read_to_string(&path).with_context(|| format!("Unable to read {}", path.display()))
    })?;
    fs::write(output, inlined)
        .with_context(|| format!("Unable to write script {}", output.display()))
}
