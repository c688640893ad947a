//! Semantic Patch Core - last-resort source patcher.
//!
//! When exact and fuzzy patch application both fail because line numbers in
//! the target tree have drifted, this crate locates known code constructs by
//! structure instead of by offset and rewrites them in place.
//!
//! # Example
//!
//! ```rust,no_run
//! use semantic_patch_core::{MemoryLogSink, PatcherOptions, SemanticPatcher, SourceRoot};
//!
//! fn main() -> semantic_patch_core::Result<()> {
//!     let root = SourceRoot::new("/path/to/v8")?;
//!     let mut sink = MemoryLogSink::new();
//!
//!     let result = SemanticPatcher::new(PatcherOptions::default()).apply_all(&root, &mut sink);
//!     println!(
//!         "{} succeeded, {} failed",
//!         result.success_count, result.failure_count
//!     );
//!     Ok(())
//! }
//! ```

pub mod atomic;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod executor;
pub mod log_sink;
pub mod rule;

// Re-export commonly used types
pub use atomic::atomic_write_text;
pub use config::{PatcherConfig, PatcherOptions, SourceRoot, TargetPaths};
pub use coordinator::{RuleReport, RunResult, SemanticPatcher};
pub use error::{PatchError, Result};
pub use executor::{apply_rule, Outcome};
pub use log_sink::{LogSink, MemoryLogSink, TeeLogSink};
pub use rule::{catalogue, Rewrite, Rewritten, Rule};
