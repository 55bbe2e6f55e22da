//! Canonical finding record produced by SARIF ingestion.

use serde::{Deserialize, Serialize};

/// Closed defect taxonomy used by the scorer.
///
/// Analyzer rule identifiers are resolved into this enumeration; anything
/// the rule map cannot place lands in `Unknown` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    BufferOverflow,
    NullDeref,
    Leak,
    UseAfterFree,
    IntegerOverflow,
    FormatString,
    DivideByZero,
    Uninitialized,
    Deadlock,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BufferOverflow => "buffer-overflow",
            Category::NullDeref => "null-deref",
            Category::Leak => "leak",
            Category::UseAfterFree => "use-after-free",
            Category::IntegerOverflow => "integer-overflow",
            Category::FormatString => "format-string",
            Category::DivideByZero => "divide-by-zero",
            Category::Uninitialized => "uninitialized",
            Category::Deadlock => "deadlock",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized static-analysis finding.
///
/// Built once per SARIF result and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub tool: String,
    pub rule_id: String,
    pub message: String,
    pub path: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Enclosing function name, when the analyzer reported one.
    pub function: Option<String>,
    /// CWE identifier, e.g. "CWE-120", when one could be resolved.
    pub cwe: Option<String>,
    pub category: Category,
}

impl Vulnerability {
    /// Deduplication identity: two findings at the same location and
    /// function are the same finding when cross-referencing across device
    /// profiles.
    pub fn identity(&self) -> (&str, Option<u32>, Option<&str>) {
        (self.path.as_str(), self.line, self.function.as_deref())
    }
}
