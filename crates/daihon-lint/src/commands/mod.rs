//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;

pub mod compare;
pub mod info;
pub mod safety;
pub mod structure;
pub mod tone;

/// Read a script file, validate its size, and decode it.
///
/// Size is preflighted via metadata before reading into memory. Scripts
/// are expected to be UTF-8; files produced by older Windows tooling fall
/// back to Shift_JIS (cp932). A file that decodes as neither is a fatal
/// input error, never a partial verdict.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let bytes =
        std::fs::read(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            tracing::debug!(file = %path, "not valid UTF-8, trying Shift_JIS");
            let bytes = err.into_bytes();
            let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
            if had_errors {
                anyhow::bail!("{path} is neither valid UTF-8 nor Shift_JIS");
            }
            Ok(text.into_owned())
        }
    }
}
