//! Strict checks on raw provider output.
//!
//! A validator either returns the fully normalized value or a
//! [`GenerationError::Format`] / [`GenerationError::Leakage`]; partial objects
//! never escape.

use serde_json::Value;

use crate::error::{GenerationError, GenerationResult};

mod explanation;
mod hints;

pub use explanation::validate_explanation;
pub use hints::validate_hints;

/// Parse `raw` as JSON, falling back to the span between the first `open`
/// and the last `close` when the provider wrapped the payload in prose or
/// code fences.
pub(crate) fn parse_with_recovery(raw: &str, open: char, close: char) -> GenerationResult<Value> {
    let direct_err = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };

    let start = raw.find(open);
    let end = raw.rfind(close);
    match (start, end) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&raw[start..=end])
            .map_err(|e| GenerationError::format(format!("invalid JSON in recovered span: {e}"))),
        _ => Err(GenerationError::format(format!(
            "response is not JSON ({direct_err}) and contains no {open}...{close} span"
        ))),
    }
}

/// Case-insensitive substring test against the trimmed answer.
///
/// A blank answer never matches.
pub(crate) fn leaks_answer(text: &str, answer: &str) -> bool {
    let needle = answer.trim().to_lowercase();
    !needle.is_empty() && text.to_lowercase().contains(&needle)
}

pub(crate) fn ensure_no_leak(text: &str, answer: &str, field: impl FnOnce() -> String) -> GenerationResult<()> {
    if leaks_answer(text, answer) {
        Err(GenerationError::leakage(field()))
    } else {
        Ok(())
    }
}
