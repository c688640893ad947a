//! The fixed rule catalogue.
//!
//! Each rule targets one V8 source file:
//! 1. `src/objects/string.cc` - drop the debug-print truncation guard
//! 2. `src/snapshot/deserializer.cc` - drop the snapshot magic number check
//! 3. `src/snapshot/code-serializer.cc` - make the code cache sanity check pass

use super::{Rewrite, Rule};
use crate::config::TargetPaths;

/// The `if (len > kMaxShortPrintLength) { ... }` block up to its closing
/// brace. Leading whitespace is folded into the single newline separator.
const STRING_TRUNCATION_GUARD: &str =
    r"\s*if\s*\(\s*len\s*>\s*kMaxShortPrintLength\s*\)\s*\{[^}]*\}[ \t]*(?:\r?\n)?";

/// `CHECK_EQ(magic_number_, SerializedData::kMagicNumber);`, in order of preference:
/// alone on its line (line removed), leading its line (indent kept),
/// trailing another statement (line ending kept).
const MAGIC_NUMBER_CHECK: &str = concat!(
    r"(?m)^[ \t]*CHECK_EQ\s*\(\s*magic_number_\s*,\s*SerializedData::kMagicNumber\s*\)",
    r"[ \t]*;?[ \t]*(?:\r?\n|$)",
    r"|^(?P<indent>[ \t]*)CHECK_EQ\s*\(\s*magic_number_\s*,\s*SerializedData::kMagicNumber\s*\)",
    r"[ \t]*;?[ \t]*",
    r"|[ \t]*CHECK_EQ\s*\(\s*magic_number_\s*,\s*SerializedData::kMagicNumber\s*\)[ \t]*;?",
);

/// `SanityCheck(...) const {` followed by its three-statement body.
const SANITY_CHECK_BODY: &str = concat!(
    r"(?P<signature>SerializedCodeSanityCheckResult\s+SerializedCodeData::SanityCheck\s*",
    r"\([^)]*\)\s*const\s*\{)\s*",
    r"SerializedCodeSanityCheckResult\s+result\s*=\s*SanityCheckWithoutSource\s*\(\s*\)\s*;\s*",
    r"if\s*\([^)]*\)\s*return\s+result\s*;\s*",
    r"return\s+SanityCheckJustSource\s*\([^)]*\)\s*;",
);

const SANITY_CHECK_BYPASS: &str = "${signature}\n  return SerializedCodeSanityCheckResult::kSuccess;";

/// `SanityCheck(...) const {` whose body is only the success return.
const SANITY_CHECK_BYPASSED: &str = concat!(
    r"SerializedCodeSanityCheckResult\s+SerializedCodeData::SanityCheck\s*",
    r"\([^)]*\)\s*const\s*\{\s*",
    r"return\s+SerializedCodeSanityCheckResult::kSuccess\s*;\s*\}",
);

pub fn string_truncation_guard() -> Rule {
    Rule {
        name: "string.cc",
        description: "remove debug-print truncation guard",
        relative_path: TargetPaths::STRING_CC,
        pattern: STRING_TRUNCATION_GUARD,
        rewrite: Rewrite::Delete { separator: "\n" },
        applied_marker: None,
    }
}

pub fn magic_number_check() -> Rule {
    Rule {
        name: "deserializer.cc",
        description: "remove snapshot magic number check",
        relative_path: TargetPaths::DESERIALIZER_CC,
        pattern: MAGIC_NUMBER_CHECK,
        rewrite: Rewrite::DeleteKeepIndent,
        applied_marker: None,
    }
}

pub fn sanity_check_bypass() -> Rule {
    Rule {
        name: "code-serializer.cc",
        description: "bypass code cache sanity check",
        relative_path: TargetPaths::CODE_SERIALIZER_CC,
        pattern: SANITY_CHECK_BODY,
        rewrite: Rewrite::ReplaceBody {
            template: SANITY_CHECK_BYPASS,
        },
        applied_marker: Some(SANITY_CHECK_BYPASSED),
    }
}

/// All rules, in application order.
pub fn catalogue() -> Vec<Rule> {
    vec![
        string_truncation_guard(),
        magic_number_check(),
        sanity_check_bypass(),
    ]
}
