//! Fixed keyword dictionaries for complexity scoring.
//!
//! These tables are the scoring vocabulary: hits are counted by substring
//! membership against lowercased text. The lists are deliberately static
//! so scoring stays deterministic and testable.

/// Words that signal trivial or small work.
pub const SIMPLE_KEYWORDS: &[&str] = &[
    "fix", "typo", "rename", "cleanup", "tweak", "comment", "readme", "bump", "format", "lint",
    "docs", "minor", "trivial", "whitespace",
];

/// Words that signal standard feature work.
pub const MODERATE_KEYWORDS: &[&str] = &[
    "add",
    "implement",
    "create",
    "feature",
    "endpoint",
    "integrate",
    "refactor",
    "test",
    "validate",
    "parser",
    "module",
];

/// Words that signal large or cross-cutting work.
pub const COMPLEX_KEYWORDS: &[&str] = &[
    "architecture",
    "migration",
    "optimize",
    "concurrency",
    "async",
    "distributed",
    "microservice",
    "scalability",
    "performance",
    "security",
    "algorithm",
    "infrastructure",
    "redesign",
];

/// Words that signal architectural or high-risk work.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "critical",
    "kubernetes",
    "cqrs",
    "event-sourcing",
    "saga",
    "consensus",
    "sharding",
    "realtime",
    "real-time",
    "machine-learning",
    "zero-downtime",
    "disaster-recovery",
];

/// Count keywords from `keywords` appearing in (lowercased) `text`.
///
/// Each keyword counts at most once, regardless of repetition.
pub fn count_hits(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}
