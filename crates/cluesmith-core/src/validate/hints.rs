use serde_json::Value;

use super::{ensure_no_leak, parse_with_recovery};
use crate::error::{GenerationError, GenerationResult};
use crate::model::{HINTS_PER_CLUE, HINT_LABELS};

/// Validate a hint response: a JSON array of exactly three labeled strings,
/// none of which contains the answer.
///
/// Returns the trimmed hints in their original order.
pub fn validate_hints(raw: &str, answer: &str) -> GenerationResult<Vec<String>> {
    let parsed = parse_with_recovery(raw, '[', ']')?;

    let items = match parsed {
        Value::Array(items) if items.len() == HINTS_PER_CLUE => items,
        Value::Array(items) => {
            return Err(GenerationError::format(format!(
                "expected exactly {HINTS_PER_CLUE} hints, got {}",
                items.len()
            )))
        }
        _ => return Err(GenerationError::format("hints must be a JSON array")),
    };

    let mut out = Vec::with_capacity(HINTS_PER_CLUE);
    for (i, item) in items.into_iter().enumerate() {
        let Value::String(text) = item else {
            return Err(GenerationError::format(format!("hint {} is not a string", i + 1)));
        };
        let hint = text.trim();

        ensure_no_leak(hint, answer, || format!("hint {}", i + 1))?;

        let Some((label, _)) = hint.split_once(':') else {
            return Err(GenerationError::format(format!(
                "hint {} has no label (expected 'Label: text')",
                i + 1
            )));
        };
        let label = label.trim().to_lowercase();
        if !HINT_LABELS.contains(&label.as_str()) {
            return Err(GenerationError::format(format!(
                "hint {} has unknown label '{}'",
                i + 1,
                label
            )));
        }

        out.push(hint.to_string());
    }
    Ok(out)
}
