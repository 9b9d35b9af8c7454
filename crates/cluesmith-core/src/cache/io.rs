//! Atomic document writes shared by the cache and output files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;

use crate::error::{GenerationError, GenerationResult};

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to a sibling temp file, then rename it over `path`.
pub(crate) async fn write_atomic_impl(path: &Path, content: &str) -> GenerationResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| GenerationError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);

    fs::write(&temp_path, content)
        .await
        .map_err(|e| GenerationError::io(&temp_path, format!("failed to write temp file: {e}")))?;

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(GenerationError::io(
            path,
            format!("failed to rename temp file: {e}"),
        ));
    }

    Ok(())
}

/// Pretty-print `value` as JSON and write it atomically.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> GenerationResult<()> {
    let mut body = serde_json::to_string_pretty(value)
        .map_err(|e| GenerationError::io(path, format!("failed to serialize: {e}")))?;
    body.push('\n');
    write_atomic_impl(path, &body).await
}
