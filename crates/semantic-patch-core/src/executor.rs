//! Applies one rule to one file.

use crate::atomic::atomic_write_text;
use crate::config::{PatcherOptions, SourceRoot};
use crate::error::PatchError;
use crate::rule::{Rewritten, Rule};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// What happened when a rule was applied.
#[derive(Debug)]
pub enum Outcome {
    /// The target file does not exist under the source root.
    FileMissing(PathBuf),
    /// The construct is absent. `already_applied` is set when the rule's
    /// post-patch marker was found instead.
    PatternNotFound { already_applied: bool },
    /// The construct matched but rewriting it changed nothing.
    NoChange,
    /// The file was rewritten and persisted.
    Applied { replacements: usize },
    /// Reading or writing the file failed.
    Io(PatchError),
    /// Matching or rewriting failed unexpectedly.
    Exception(String),
}

impl Outcome {
    /// Whether this outcome counts towards the run's successes.
    ///
    /// Absent or no-op matches count as success so that re-running over a
    /// patched tree converges.
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::PatternNotFound { .. } | Outcome::NoChange | Outcome::Applied { .. } => true,
            Outcome::FileMissing(_) | Outcome::Io(_) | Outcome::Exception(_) => false,
        }
    }

    /// Stable label for the outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::FileMissing(_) => "file-missing",
            Outcome::PatternNotFound { .. } => "pattern-not-found",
            Outcome::NoChange => "no-change",
            Outcome::Applied { .. } => "applied",
            Outcome::Io(_) => "io-error",
            Outcome::Exception(_) => "exception",
        }
    }
}

/// Apply `rule` to its target file under `root`.
///
/// The file is read whole, rewritten in memory and replaced atomically, so it
/// ends up either untouched or fully patched.
pub fn apply_rule(rule: &Rule, root: &SourceRoot, options: &PatcherOptions) -> Outcome {
    let path = root.join(rule.relative_path);
    if !path.exists() {
        debug!("{} not found at {}", rule.name, path.display());
        return Outcome::FileMissing(path);
    }

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return Outcome::Io(PatchError::io_with_path(e, &path)),
    };

    let (rewritten, replacements) = match rule.rewrite(&content) {
        Ok(Rewritten::Matched { content, matches }) => (content, matches),
        Ok(Rewritten::NotFound) => {
            return match rule.is_applied(&content) {
                Ok(already_applied) => Outcome::PatternNotFound { already_applied },
                Err(e) => Outcome::Exception(e.to_string()),
            };
        }
        Err(e) => return Outcome::Exception(e.to_string()),
    };

    if rewritten == content {
        return Outcome::NoChange;
    }

    debug!(
        "{}: {} match(es), {} -> {} bytes",
        rule.name,
        replacements,
        content.len(),
        rewritten.len()
    );

    match atomic_write_text(&path, &rewritten, options.keep_backup) {
        Ok(()) => Outcome::Applied { replacements },
        Err(e) => Outcome::Io(e),
    }
}
