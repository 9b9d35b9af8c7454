//! Writing the hint and explanation maps for downstream rendering.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::cache::io::write_json_atomic;
use crate::error::GenerationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Replace the target unconditionally.
    Always,
    /// Never replace an existing target with an empty map.
    PreserveExisting,
}

/// Write `map` to `path` atomically. Returns whether the file was written.
pub async fn write_map<T: Serialize>(
    path: &Path,
    map: &BTreeMap<String, T>,
    policy: WritePolicy,
) -> GenerationResult<bool> {
    if policy == WritePolicy::PreserveExisting
        && map.is_empty()
        && tokio::fs::try_exists(path).await.unwrap_or(false)
    {
        debug!(path = %path.display(), "keeping existing output, nothing to write");
        return Ok(false);
    }
    write_json_atomic(path, map).await?;
    Ok(true)
}
