//! Component extraction.
//!
//! Heuristically parses a dialect-specific code blob into a set of named
//! components, to track "what currently exists". The code is treated as an
//! opaque text blob; extraction is lightweight pattern matching, not parsing.
//!
//! Each call recomputes the full set from scratch from the latest code. It
//! never incrementally diffs against a previous set, so the derived
//! `component_state` cannot drift from what the code actually contains. The
//! trade-off is that only current presence is tracked, not provenance of
//! components removed in earlier steps.

use crate::session::DiagramDialect;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn cloud_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `name = SomeCall(` assignment-and-call nodes.
    PATTERN.get_or_init(|| Regex::new(r"(\w+)\s*=\s*\w+\(").expect("valid cloud pattern"))
}

fn mermaid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Identifiers immediately followed by a bracketed or parenthesized label.
    PATTERN.get_or_init(|| Regex::new(r"(\w+)[\[\(].*?[\]\)]").expect("valid mermaid pattern"))
}

fn d2_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Line-start identifiers followed by a colon.
    PATTERN.get_or_init(|| Regex::new(r"(?m)^(\w+):").expect("valid d2 pattern"))
}

/// Extracts the set of component names present in `code`.
///
/// Returns an empty set for [`DiagramDialect::Unset`]. Set semantics:
/// order-independent, duplicate-free, and idempotent over identical input.
pub fn extract_components(code: &str, dialect: DiagramDialect) -> BTreeSet<String> {
    let pattern = match dialect {
        DiagramDialect::Cloud => cloud_pattern(),
        DiagramDialect::Mermaid => mermaid_pattern(),
        DiagramDialect::D2 => d2_pattern(),
        DiagramDialect::Unset => return BTreeSet::new(),
    };

    pattern
        .captures_iter(code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}
