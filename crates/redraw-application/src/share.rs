//! Shareable playground links for D2 diagrams.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

const PLAYGROUND_BASE_URL: &str = "https://play.terrastruct.com/?script=";

/// Builds a Terrastruct playground link embedding the given D2 source.
///
/// Markdown code fences are stripped before encoding so that drafter output
/// quoted as a fenced block still produces a loadable script.
pub fn terrastruct_play_link(code: &str) -> String {
    let cleaned = strip_code_fences(code);
    let encoded = URL_SAFE.encode(cleaned.as_bytes());
    format!("{PLAYGROUND_BASE_URL}{encoded}")
}

/// Removes a surrounding markdown code fence, if present.
fn strip_code_fences(code: &str) -> &str {
    let trimmed = code.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence line itself (which may carry a language tag).
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => return trimmed,
    };
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}
