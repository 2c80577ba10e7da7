use std::path::Path;

use tracing::{error, warn};

use crate::document::{write_atomic, Document};
use crate::error::ProofError;

/// Reads a line-oriented log, returning its trimmed, non-empty lines.
///
/// A missing or unreadable file is logged and yields an empty list; callers
/// treat an empty result as "no data".
pub fn read_lines(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    match try_read_lines(path) {
        Ok(lines) => lines,
        Err(ProofError::NotFound { .. }) => {
            warn!(path = %path.display(), "log file not found");
            Vec::new()
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "failed to read log file");
            Vec::new()
        }
    }
}

/// Same as [`read_lines`] but reports why the log could not be read.
pub fn try_read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, ProofError> {
    let path = path.as_ref();
    let document = Document::open(path).map_err(|err| ProofError::read(path, err))?;
    Ok(split_log_lines(document.text()))
}

pub fn split_log_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Overwrites `path` with one UTF-8 line per entry.
pub fn write_lines<I, S>(path: impl AsRef<Path>, lines: I) -> Result<(), ProofError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let mut payload = String::new();
    for line in lines {
        payload.push_str(line.as_ref());
        payload.push('\n');
    }
    write_atomic(path, payload.as_bytes()).map_err(|err| ProofError::write(path, err))
}
