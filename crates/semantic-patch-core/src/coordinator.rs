//! Drives the rule catalogue over a source tree.

use crate::config::{PatcherConfig, PatcherOptions, SourceRoot};
use crate::executor::{apply_rule, Outcome};
use crate::log_sink::LogSink;
use crate::rule::{catalogue, Rule};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Outcome of one rule within a run.
#[derive(Debug)]
pub struct RuleReport {
    pub name: &'static str,
    pub relative_path: &'static str,
    pub outcome: Outcome,
}

/// Aggregate result of a run.
#[derive(Debug, Default)]
pub struct RunResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub reports: Vec<RuleReport>,
}

impl RunResult {
    /// A run succeeds if at least one rule succeeded.
    ///
    /// Checking that every required patch landed is left to later pipeline
    /// stages.
    pub fn is_success(&self) -> bool {
        self.success_count > 0
    }

    fn record(&mut self, report: RuleReport) {
        if report.outcome.is_success() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.reports.push(report);
    }
}

/// Applies a fixed, ordered list of rules.
pub struct SemanticPatcher {
    rules: Vec<Rule>,
    options: PatcherOptions,
}

impl SemanticPatcher {
    /// Create a patcher over the built-in catalogue.
    pub fn new(options: PatcherOptions) -> Self {
        Self::with_rules(catalogue(), options)
    }

    pub fn with_rules(rules: Vec<Rule>, options: PatcherOptions) -> Self {
        Self { rules, options }
    }

    /// Apply every rule in order, never stopping early.
    pub fn apply_all(&self, root: &SourceRoot, sink: &mut dyn LogSink) -> RunResult {
        let mut result = RunResult::default();

        log(sink, "Applying semantic patches...");
        sink.write_line("");

        for rule in &self.rules {
            log(
                sink,
                &format!("Processing {} ({})...", rule.name, rule.description),
            );

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                apply_rule(rule, root, &self.options)
            }))
            .unwrap_or_else(|payload| Outcome::Exception(panic_message(payload.as_ref())));

            debug!("{} -> {}", rule.relative_path, outcome.kind());
            log(sink, &status_line(rule, &outcome));
            sink.write_line("");

            result.record(RuleReport {
                name: rule.name,
                relative_path: rule.relative_path,
                outcome,
            });
        }

        log(
            sink,
            &format!(
                "Result: {} succeeded, {} failed",
                result.success_count, result.failure_count
            ),
        );
        sink.write_line("");

        result
    }
}

fn log(sink: &mut dyn LogSink, message: &str) {
    sink.write_line(&format!("{} {}", PatcherConfig::LOG_PREFIX, message));
}

fn status_line(rule: &Rule, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied { replacements } => format!(
            "✅ {}: semantic patch applied ({} replacement(s))",
            rule.name, replacements
        ),
        Outcome::PatternNotFound {
            already_applied: true,
        } => format!("⚠️  {}: already in patched form", rule.name),
        Outcome::PatternNotFound {
            already_applied: false,
        } => format!(
            "⚠️  {}: pattern not found (patch may already be in place)",
            rule.name
        ),
        Outcome::NoChange => format!("⚠️  {}: pattern matched but content unchanged", rule.name),
        Outcome::FileMissing(path) => format!("✗ File not found: {}", path.display()),
        Outcome::Io(e) => format!("✗ {}: {}", rule.name, e),
        Outcome::Exception(message) => {
            format!("✗ Exception while processing {}: {}", rule.name, message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLogSink;
    use crate::rule::{magic_number_check, string_truncation_guard, Rewrite};
    use tempfile::TempDir;

    fn seed(temp_dir: &TempDir, relative: &str, content: &str) {
        let path = temp_dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_empty_tree_fails_every_rule() {
        let temp_dir = TempDir::new().unwrap();
        let root = SourceRoot::new(temp_dir.path()).unwrap();
        let mut sink = MemoryLogSink::new();

        let result = SemanticPatcher::new(PatcherOptions::default()).apply_all(&root, &mut sink);

        assert_eq!(result.success_count, 0);
        assert_eq!(result.failure_count, 3);
        assert!(!result.is_success());
        assert_eq!(sink.count_containing("File not found"), 3);
        assert_eq!(sink.lines().last().map(String::as_str), Some(""));
        assert!(sink
            .lines()
            .contains(&"[SEMANTIC] Result: 0 succeeded, 3 failed".to_string()));
    }

    #[test]
    fn test_one_applied_two_absent_is_success() {
        let temp_dir = TempDir::new().unwrap();
        seed(
            &temp_dir,
            "src/objects/string.cc",
            "void Print() {\n  Put('<');\n}\n",
        );
        seed(
            &temp_dir,
            "src/snapshot/deserializer.cc",
            "  CHECK_EQ(magic_number_, SerializedData::kMagicNumber);\n",
        );
        seed(&temp_dir, "src/snapshot/code-serializer.cc", "// nothing\n");
        let root = SourceRoot::new(temp_dir.path()).unwrap();
        let mut sink = MemoryLogSink::new();

        let result = SemanticPatcher::new(PatcherOptions::default()).apply_all(&root, &mut sink);

        assert_eq!(result.success_count, 3);
        assert_eq!(result.failure_count, 0);
        assert!(result.is_success());
        let kinds: Vec<_> = result.reports.iter().map(|r| r.outcome.kind()).collect();
        assert_eq!(kinds, vec!["pattern-not-found", "applied", "pattern-not-found"]);
    }

    #[test]
    fn test_failure_does_not_stop_later_rules() {
        let temp_dir = TempDir::new().unwrap();
        seed(
            &temp_dir,
            "src/snapshot/deserializer.cc",
            "CHECK_EQ(magic_number_, SerializedData::kMagicNumber);\n",
        );
        let root = SourceRoot::new(temp_dir.path()).unwrap();
        let rules = vec![string_truncation_guard(), magic_number_check()];
        let mut sink = MemoryLogSink::new();

        let result = SemanticPatcher::with_rules(rules, PatcherOptions::default())
            .apply_all(&root, &mut sink);

        assert_eq!(result.failure_count, 1);
        assert_eq!(result.success_count, 1);
        assert!(result.is_success());
        assert!(matches!(
            result.reports[1].outcome,
            Outcome::Applied { replacements: 1 }
        ));
    }

    #[test]
    fn test_bad_rule_is_isolated() {
        let temp_dir = TempDir::new().unwrap();
        seed(&temp_dir, "broken.cc", "text");
        seed(
            &temp_dir,
            "src/snapshot/deserializer.cc",
            "CHECK_EQ(magic_number_, SerializedData::kMagicNumber);\n",
        );
        let broken = Rule {
            name: "broken.cc",
            description: "unbalanced group",
            relative_path: "broken.cc",
            pattern: r"(text",
            rewrite: Rewrite::Delete { separator: "" },
            applied_marker: None,
        };
        let root = SourceRoot::new(temp_dir.path()).unwrap();
        let mut sink = MemoryLogSink::new();

        let result =
            SemanticPatcher::with_rules(vec![broken, magic_number_check()], PatcherOptions::default())
                .apply_all(&root, &mut sink);

        assert_eq!(result.reports[0].outcome.kind(), "exception");
        assert_eq!(result.reports[1].outcome.kind(), "applied");
        assert_eq!(sink.count_containing("Exception while processing broken.cc"), 1);
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
