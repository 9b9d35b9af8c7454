use serde_json::{Map, Value};

use super::{ensure_no_leak, parse_with_recovery};
use crate::error::{GenerationError, GenerationResult};
use crate::model::{Explanation, Highlight, HighlightRole, MAX_STEPS, MIN_STEPS};

/// Validate an explanation response.
///
/// Shape: `{"device": str, "steps": [str; 1..=10], "highlights": [{"role", "text"}]}`.
/// A missing `highlights` key is read as an empty list. Steps and highlight
/// texts must not contain the answer.
pub fn validate_explanation(raw: &str, answer: &str) -> GenerationResult<Explanation> {
    let parsed = parse_with_recovery(raw, '{', '}')?;
    let Value::Object(obj) = parsed else {
        return Err(GenerationError::format("explanation must be a JSON object"));
    };

    let device = match obj.get("device") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(GenerationError::format("device must be a string")),
        None => return Err(GenerationError::format("device is missing")),
    };

    let steps = steps_of(&obj)?;
    let highlights = highlights_of(&obj)?;

    for (i, step) in steps.iter().enumerate() {
        ensure_no_leak(step, answer, || format!("step {}", i + 1))?;
    }
    for (i, h) in highlights.iter().enumerate() {
        ensure_no_leak(&h.text, answer, || format!("highlight {}", i + 1))?;
    }

    Ok(Explanation {
        device,
        steps,
        highlights,
    })
}

fn steps_of(obj: &Map<String, Value>) -> GenerationResult<Vec<String>> {
    let Some(Value::Array(items)) = obj.get("steps") else {
        return Err(GenerationError::format("steps must be an array of strings"));
    };
    if !(MIN_STEPS..=MAX_STEPS).contains(&items.len()) {
        return Err(GenerationError::format(format!(
            "steps must contain {MIN_STEPS}-{MAX_STEPS} items, got {}",
            items.len()
        )));
    }
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| GenerationError::format("steps must be an array of strings"))
        })
        .collect()
}

fn highlights_of(obj: &Map<String, Value>) -> GenerationResult<Vec<Highlight>> {
    let items = match obj.get("highlights") {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(GenerationError::format("highlights must be an array")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Object(h) = item else {
                return Err(GenerationError::format(format!(
                    "highlight {} must be an object",
                    i + 1
                )));
            };
            let role = h
                .get("role")
                .and_then(Value::as_str)
                .and_then(HighlightRole::parse)
                .ok_or_else(|| {
                    GenerationError::format(format!("highlight {} has an invalid role", i + 1))
                })?;
            let text = h.get("text").and_then(Value::as_str).ok_or_else(|| {
                GenerationError::format(format!("highlight {} text must be a string", i + 1))
            })?;
            Ok(Highlight {
                role,
                text: text.to_string(),
            })
        })
        .collect()
}
