//! Request classification.
//!
//! Two lightweight classification concerns feed session state:
//!
//! - edit-vs-create: is this request a refinement of the session's current
//!   code, or a fresh diagram?
//! - dialect detection: which diagram dialect does a fresh prompt call for?
//!
//! Both are pure keyword heuristics with no semantic understanding. False
//! positives (e.g. "can you" in a creation prompt) are a known, accepted
//! imprecision of the shipped strategy, not a bug to silently fix.

use crate::session::{DiagramDialect, Session};
use std::path::Path;

/// Keywords denoting mutation intent. Case-insensitive substring match.
const EDIT_KEYWORDS: &[&str] = &[
    "remove",
    "delete",
    "add",
    "modify",
    "change",
    "update",
    "replace",
    "edit",
    "adjust",
    "move",
    "without",
    "exclude",
    "include",
    "make it",
    "can you",
    "instead",
    "drop",
    "remake",
    "reorder",
    "restructure",
    "rebuild",
];

const D2_KEYWORDS: &[&str] = &["d2", "modern diagram", "declarative", "system architecture"];

const CLOUD_KEYWORDS: &[&str] = &[
    "aws", "azure", "gcp", "cloud", "ec2", "s3", "rds", "lambda", "vpc", "vnet", "cosmos",
    "bigquery",
];

const MERMAID_KEYWORDS: &[&str] = &[
    "flowchart",
    "sequence",
    "er diagram",
    "class diagram",
    "process",
];

/// Strategy interface for edit-vs-create classification.
///
/// The heuristic is versioned behind this trait so it can be improved
/// without touching callers; [`KeywordEditClassifier`] is the shipped
/// implementation.
pub trait EditClassifier: Send + Sync {
    /// Decides whether `input` is an edit of the session's current code.
    fn is_edit(&self, session: &Session, input: &str) -> bool;
}

/// Keyword-based edit classifier.
///
/// Returns true iff the session has history AND the input contains at least
/// one mutation keyword. Input that exists as a filesystem path is ALWAYS
/// classified as creation, regardless of history: a file upload is a
/// new-source import, not a conversational refinement.
#[derive(Debug, Default, Clone)]
pub struct KeywordEditClassifier;

impl KeywordEditClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl EditClassifier for KeywordEditClassifier {
    fn is_edit(&self, session: &Session, input: &str) -> bool {
        if Path::new(input).is_file() {
            return false;
        }

        if !session.has_history() {
            return false;
        }

        let input_lower = input.to_lowercase();
        EDIT_KEYWORDS.iter().any(|kw| input_lower.contains(kw))
    }
}

/// Detects the diagram dialect of a fresh prompt by keyword scoring.
///
/// The highest-scoring dialect wins; ties resolve in priority order
/// (d2, then cloud, then mermaid). When no keyword matches at all, a
/// `.tf`-suffixed input resolves to cloud (Terraform import), everything
/// else defaults to mermaid.
pub fn detect_dialect(prompt: &str) -> DiagramDialect {
    let prompt_lower = prompt.to_lowercase();

    let score = |keywords: &[&str]| -> usize {
        keywords
            .iter()
            .filter(|kw| prompt_lower.contains(*kw))
            .count()
    };

    let scores = [
        (score(D2_KEYWORDS), DiagramDialect::D2),
        (score(CLOUD_KEYWORDS), DiagramDialect::Cloud),
        (score(MERMAID_KEYWORDS), DiagramDialect::Mermaid),
    ];

    // Only a strictly greater score displaces the running best, so the
    // earliest entry wins a tie.
    let (max_score, dialect) = scores
        .into_iter()
        .fold((0, DiagramDialect::Mermaid), |best, candidate| {
            if candidate.0 > best.0 { candidate } else { best }
        });

    if max_score == 0 {
        if prompt.ends_with(".tf") {
            return DiagramDialect::Cloud;
        }
        return DiagramDialect::Mermaid;
    }

    dialect
}
