//! Durable content-addressed store of generated hints and explanations.
//!
//! # File format
//!
//! ```text
//! {
//!   "<sha256 key>": { "hints": [..3], "explanation": {..} | null, "ts": 1725100000 },
//!   ...
//! }
//! ```
//!
//! The whole map is loaded once, mutated in memory while a run is in flight and
//! written back with a temp-file rename, so readers never observe a partial file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{GenerationError, GenerationResult};
use crate::model::CacheEntry;

pub(crate) mod io;
pub mod key;

pub use key::cache_key;

/// Mutex-guarded key → entry map bound to a file path.
///
/// Concurrent writers to the same key resolve as last-writer-wins; every
/// `put` replaces the whole entry.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, CacheEntry>>,
}

impl CacheStore {
    /// Empty store that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Load the store at `path`.
    ///
    /// A missing or unparsable file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, CacheEntry>>(&text) {
                Ok(entries) => {
                    debug!(path = %path.display(), entries = entries.len(), "loaded cache");
                    entries
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cache file unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache file yet");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file unreadable, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, entry: CacheEntry) {
        self.lock().insert(key.into(), entry);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write the current map to disk atomically.
    pub async fn persist(&self) -> GenerationResult<()> {
        let body = {
            let entries = self.lock();
            serde_json::to_string_pretty(&*entries)
                .map_err(|e| GenerationError::io(&self.path, format!("failed to serialize: {e}")))?
        };
        io::write_atomic_impl(&self.path, &body).await?;
        debug!(path = %self.path.display(), "persisted cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Explanation, Highlight, HighlightRole};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn entry(tag: &str) -> CacheEntry {
        CacheEntry::new(
            vec![
                format!("Definition: {tag}"),
                "Fodder: N/A".to_string(),
                "Device: anagram".to_string(),
            ],
            Some(Explanation {
                device: "anagram".into(),
                steps: vec!["1. 'broken' signals an anagram".into()],
                highlights: vec![Highlight {
                    role: HighlightRole::Indicator,
                    text: "broken".into(),
                }],
            }),
        )
    }

    #[tokio::test]
    async fn persist_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints_cache.json");

        let store = CacheStore::new(&path);
        store.put("k1", entry("one"));
        store.put("k2", entry("two"));
        store.persist().await.unwrap();

        let reloaded = CacheStore::load(&path).await;
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("k1"), store.get("k1"));
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::load(dir.path().join("absent.json")).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hints_cache.json");
        std::fs::write(&path, "{ \"k1\": [not json").unwrap();

        let store = CacheStore::load(&path).await;
        assert!(store.is_empty());

        // The next persist replaces the corrupt file with a valid one.
        store.put("k1", entry("one"));
        store.persist().await.unwrap();
        assert_eq!(CacheStore::load(&path).await.len(), 1);
    }

    #[test]
    fn put_overwrites_whole_entry() {
        let store = CacheStore::new("unused.json");
        store.put("k", entry("first"));
        let mut second = entry("second");
        second.explanation = None;
        store.put("k", second.clone());
        assert_eq!(store.get("k"), Some(second));
    }

    #[test]
    fn concurrent_puts_are_serialized() {
        let store = Arc::new(CacheStore::new("unused.json"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.put(format!("k{i}-{j}"), entry("x"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
