//! Status line sinks.
//!
//! The coordinator only needs to append human-readable lines; where they end
//! up is the sink's concern. Sinks never fail upward.

use crate::error::{PatchError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Something that accepts status lines.
pub trait LogSink {
    /// Append one line. Implementations swallow their own failures.
    fn write_line(&mut self, line: &str);
}

/// Mirrors every line to stdout and to an append-mode log file.
pub struct TeeLogSink {
    file: File,
    path: PathBuf,
}

impl TeeLogSink {
    /// Open (or create) the log file for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| PatchError::Io {
                message: format!("Failed to open log file: {}", e),
                path: Some(path.to_path_buf()),
                source: Some(e),
            })?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for TeeLogSink {
    fn write_line(&mut self, line: &str) {
        // A closed stdout must not stop the file copy.
        let _ = writeln!(io::stdout().lock(), "{}", line);

        if let Err(e) = writeln!(self.file, "{}", line).and_then(|()| self.file.flush()) {
            warn!("Failed to append to {}: {}", self.path.display(), e);
        }
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogSink {
    lines: Vec<String>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines containing `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines.iter().filter(|l| l.contains(needle)).count()
    }
}

impl LogSink for MemoryLogSink {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}
