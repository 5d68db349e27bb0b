//! Extraction of the FINDINGS JSON block from agent output.
//!
//! Agents are asked to end their answer with a fenced JSON block. Extraction
//! is best-effort text matching: the last fenced block wins, and a missing or
//! malformed block is an ordinary error the caller reports and moves past.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::FindingsError;

/// A fenced block with an optional `json` language tag.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)```(?:json)?\s*([\s\S]*?)\s*```").unwrap_or_else(|e| {
        unreachable!("fenced block pattern is a valid regex: {e}")
    })
});

const PREVIEW_CHARS: usize = 200;

/// Parse the last fenced block of `text` as JSON.
///
/// # Errors
///
/// Returns [`FindingsError::NoFencedBlock`] if the text has no fenced block,
/// or [`FindingsError::Decode`] if the last block is not valid JSON.
///
/// # Examples
///
/// ```
/// use finops_agents::findings::extract_findings;
///
/// let text = "# Report\n\n```json\n{\"compartments\": []}\n```\n";
/// let findings = extract_findings(text).unwrap();
/// assert!(findings["compartments"].as_array().unwrap().is_empty());
/// ```
pub fn extract_findings(text: &str) -> Result<Value, FindingsError> {
    let block = FENCED_BLOCK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .last()
        .ok_or(FindingsError::NoFencedBlock)?;

    let payload = block.as_str().trim();
    serde_json::from_str(payload).map_err(|e| FindingsError::Decode {
        line: e.line(),
        column: e.column(),
        message: e.to_string(),
        preview: preview(payload),
    })
}

fn preview(payload: &str) -> String {
    payload
        .chars()
        .take(PREVIEW_CHARS)
        .collect::<String>()
        .replace('\n', "\\n")
}
