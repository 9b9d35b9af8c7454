use std::path::Path;

use crate::error::{GenerationError, GenerationResult};
use crate::model::{ClueRecord, GameData};

/// Read the clue list produced by the answer extraction step.
///
/// This is the only input whose absence is fatal to a run.
pub async fn load_clues(path: &Path) -> GenerationResult<Vec<ClueRecord>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| GenerationError::io(path, e))?;
    let data: GameData = serde_json::from_str(&text)
        .map_err(|e| GenerationError::io(path, format!("invalid clue list: {e}")))?;
    Ok(data.clues)
}
