//! Edit-instruction building.
//!
//! Classifies the operation kind of an edit request and emits an explicit,
//! drafter-facing directive with anti-regression constraints.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

const RULE: &str = "==================================================";

/// Known cloud resource abbreviations matched as whole tokens.
const RESOURCE_ABBREVIATIONS: &[&str] = &[
    "s3",
    "rds",
    "ec2",
    "lambda",
    "dynamo",
    "vpc",
    "elb",
    "sns",
    "sqs",
    "cloudwatch",
];

/// The kind of edit an incoming request asks for.
///
/// Chosen by a first-match keyword scan in strict priority order
/// (Remove > Add > Replace > default Modify). This is a priority list, not
/// independent multi-label classification: "replace the cache and add a
/// queue" classifies as Add because the ADD family outranks REPLACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    Remove,
    Add,
    Replace,
    Modify,
}

impl EditOperation {
    /// Stable uppercase name used in directive text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "REMOVE",
            Self::Add => "ADD",
            Self::Replace => "REPLACE",
            Self::Modify => "MODIFY",
        }
    }
}

impl std::fmt::Display for EditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified edit request, ready to hand to the external drafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditInstruction {
    /// The operation family the request was classified into.
    pub operation: EditOperation,
    /// Likely target component names, lowercased and deduplicated.
    ///
    /// Advisory context only: the drafter is still told to delete ALL
    /// references, not limited to this list.
    pub targets: Vec<String>,
    /// The full drafter-facing directive text.
    pub directive: String,
}

fn suffix_target_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `<name> bucket|instance|database|function|table`
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w+)\s+(?:bucket|instance|database|function|table)")
            .expect("valid target suffix pattern")
    })
}

/// Extracts likely target component names from a removal request.
///
/// Matches the fixed abbreviation vocabulary plus the resource-noun suffix
/// pattern over the lowercased request.
fn extract_target_components(request: &str) -> Vec<String> {
    let request_lower = request.to_lowercase();
    let mut targets = BTreeSet::new();

    for abbrev in RESOURCE_ABBREVIATIONS {
        if request_lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token == *abbrev)
        {
            targets.insert((*abbrev).to_string());
        }
    }

    for caps in suffix_target_pattern().captures_iter(&request_lower) {
        if let Some(name) = caps.get(1) {
            targets.insert(name.as_str().to_string());
        }
    }

    targets.into_iter().collect()
}

/// Classifies the operation kind of a request.
///
/// First matching family wins, in priority order.
pub fn classify_operation(request: &str) -> EditOperation {
    let request_lower = request.to_lowercase();
    let contains_any =
        |words: &[&str]| -> bool { words.iter().any(|w| request_lower.contains(w)) };

    if contains_any(&["remove", "delete", "drop", "exclude"]) {
        EditOperation::Remove
    } else if contains_any(&["add", "include", "insert"]) {
        EditOperation::Add
    } else if contains_any(&["replace", "change", "swap"]) {
        EditOperation::Replace
    } else {
        EditOperation::Modify
    }
}

/// Builds the full edit instruction for a request.
///
/// The directive always closes with the anti-regression clause: previously
/// removed items must not reappear.
pub fn build_instruction(request: &str) -> EditInstruction {
    let operation = classify_operation(request);
    let targets = match operation {
        EditOperation::Remove => extract_target_components(request),
        _ => Vec::new(),
    };

    let mut directive = format!("\n{RULE}\nEDITING INSTRUCTIONS:\n{RULE}\n");
    directive.push_str(&format!("User Request: {request}\n\n"));
    directive.push_str(&format!("OPERATION: {operation}\n"));

    match operation {
        EditOperation::Remove => {
            if !targets.is_empty() {
                directive.push_str(&format!("Target: {}\n", targets.join(", ")));
            }
            directive
                .push_str("Action: Delete ALL references to these components from the code\n");
        }
        EditOperation::Add => {
            directive.push_str("Action: Add new components while preserving existing ones\n");
        }
        EditOperation::Replace => {
            directive.push_str("Action: Replace specified component with new one\n");
        }
        EditOperation::Modify => {
            directive.push_str("Action: Make the requested changes\n");
        }
    }

    directive.push_str(
        "\nCRITICAL: Base your edits on the CURRENT CODE provided. Previously removed items must not reappear.\n",
    );
    directive.push_str(&format!("{RULE}\n"));

    EditInstruction {
        operation,
        targets,
        directive,
    }
}
