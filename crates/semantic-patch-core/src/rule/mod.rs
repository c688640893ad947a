//! Transformation rules.
//!
//! A rule pairs a whitespace-tolerant detection pattern with a rewrite
//! action for one target file. Rules are plain data; applying them is the
//! executor's job.

mod builtin;

pub use builtin::{
    catalogue, magic_number_check, sanity_check_bypass, string_truncation_guard,
};

use crate::error::{PatchError, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;

/// How a matched span is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace every match with a literal separator (no capture expansion).
    /// A match at the very start of the file is removed without a separator.
    Delete { separator: &'static str },
    /// Remove every match but keep the text captured as `indent`, if any.
    DeleteKeepIndent,
    /// Replace every match with a template; `${signature}` expands to the
    /// captured function signature and opening brace.
    ReplaceBody { template: &'static str },
}

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Short name used in status lines (the target's file name).
    pub name: &'static str,
    /// What the rule does, for humans.
    pub description: &'static str,
    /// Target path relative to the source root.
    pub relative_path: &'static str,
    /// Detection pattern, matched against the whole file.
    pub pattern: &'static str,
    pub rewrite: Rewrite,
    /// Pattern that only matches the post-patch form, if one is known.
    pub applied_marker: Option<&'static str>,
}

/// Result of rewriting one file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewritten<'a> {
    /// The detection pattern matched nowhere.
    NotFound,
    /// The pattern matched `matches` times and produced `content`.
    Matched { content: Cow<'a, str>, matches: usize },
}

impl Rule {
    /// Compile the detection pattern.
    pub fn detector(&self) -> Result<Regex> {
        self.compile(self.pattern)
    }

    /// Rewrite `content`, substituting every match.
    pub fn rewrite<'a>(&self, content: &'a str) -> Result<Rewritten<'a>> {
        let detector = self.detector()?;
        let matches = detector.find_iter(content).count();
        if matches == 0 {
            return Ok(Rewritten::NotFound);
        }

        let content = match self.rewrite {
            Rewrite::Delete { separator } => detector.replace_all(content, |caps: &Captures| {
                match caps.get(0) {
                    Some(m) if m.start() == 0 => "",
                    _ => separator,
                }
            }),
            Rewrite::DeleteKeepIndent => detector.replace_all(content, "${indent}"),
            Rewrite::ReplaceBody { template } => detector.replace_all(content, template),
        };
        Ok(Rewritten::Matched { content, matches })
    }

    /// Whether `content` carries this rule's post-patch marker.
    ///
    /// Rules without a marker never report `true`.
    pub fn is_applied(&self, content: &str) -> Result<bool> {
        match self.applied_marker {
            Some(marker) => Ok(self.compile(marker)?.is_match(content)),
            None => Ok(false),
        }
    }

    fn compile(&self, source: &str) -> Result<Regex> {
        Regex::new(source).map_err(|source| PatchError::Pattern {
            rule: self.name.to_string(),
            source,
        })
    }
}
