//! Centralized configuration for the semantic patcher.
//!
//! Target paths and rules are compiled in; only run options are adjustable.

use crate::error::{PatchError, Result};
use std::path::{Path, PathBuf};

/// Patcher-level constants.
pub struct PatcherConfig;

impl PatcherConfig {
    /// Prefix of every status line written to the log sink.
    pub const LOG_PREFIX: &'static str = "[SEMANTIC]";
    /// Extension appended to the original file when backups are kept.
    pub const BACKUP_SUFFIX: &'static str = "bak";
    /// Extension of the sibling temp file used for atomic rewrites.
    pub const TEMP_SUFFIX: &'static str = "semantic.tmp";
}

/// Target files, relative to the source root.
pub struct TargetPaths;

impl TargetPaths {
    pub const STRING_CC: &'static str = "src/objects/string.cc";
    pub const DESERIALIZER_CC: &'static str = "src/snapshot/deserializer.cc";
    pub const CODE_SERIALIZER_CC: &'static str = "src/snapshot/code-serializer.cc";
}

/// Options for a patch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatcherOptions {
    /// Keep a `.bak` copy of every file before it is rewritten.
    pub keep_backup: bool,
}

/// A validated source tree root.
///
/// The root itself is never modified; only files beneath it are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    path: PathBuf,
}

impl SourceRoot {
    /// Validate that `path` is an existing directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(PatchError::NotADirectory(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a path relative to the root.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }
}
