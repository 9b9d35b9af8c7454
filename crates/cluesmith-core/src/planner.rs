//! Sorting clues into cached results and outstanding work before any
//! concurrency starts, so workers only ever write to the cache.

use tracing::debug;

use crate::cache::{cache_key, CacheStore};
use crate::model::{CacheEntry, ClueRecord, Explanation, Outputs};

/// What the cache already holds for one clue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    FullyCached {
        hints: Vec<String>,
        explanation: Explanation,
    },
    /// Hints cached, explanation still missing.
    ExplanationOnly { hints: Vec<String> },
    NeedsGeneration,
}

impl Classification {
    pub fn of(entry: Option<CacheEntry>) -> Self {
        match entry {
            Some(CacheEntry {
                hints,
                explanation: Some(explanation),
                ..
            }) => Self::FullyCached { hints, explanation },
            Some(CacheEntry { hints, .. }) => Self::ExplanationOnly { hints },
            None => Self::NeedsGeneration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkKind {
    /// Generate hints, then the explanation.
    Full,
    /// Generate the explanation and keep these hints as they are.
    ExplanationOnly { cached_hints: Vec<String> },
}

/// One unit of pending generation, consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub word_id: String,
    pub key: String,
    pub record: ClueRecord,
    pub kind: WorkKind,
}

#[derive(Debug, Clone, Default)]
pub struct WorkPlan {
    /// Content available without generation: every fully cached clue, plus
    /// the cached hints of explanation-only clues.
    pub outputs: Outputs,
    pub items: Vec<WorkItem>,
    /// Clues satisfied entirely from the cache.
    pub cached_reused: usize,
    /// Records without a usable word id.
    pub skipped: usize,
}

impl WorkPlan {
    pub fn full_items(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.kind, WorkKind::Full))
            .count()
    }
}

/// Classify every record against the cache.
pub fn plan(
    records: &[ClueRecord],
    cache: &CacheStore,
    model: &str,
    prompt_version: &str,
) -> WorkPlan {
    let mut plan = WorkPlan::default();

    for record in records {
        let Some(word_id) = record.id() else {
            plan.skipped += 1;
            continue;
        };
        let word_id = word_id.to_string();
        let key = cache_key(model, prompt_version, &record.clue, &record.answer);

        match Classification::of(cache.get(&key)) {
            Classification::FullyCached { hints, explanation } => {
                plan.outputs.hints.insert(word_id.clone(), hints);
                plan.outputs.explanations.insert(word_id, explanation);
                plan.cached_reused += 1;
            }
            Classification::ExplanationOnly { hints } => {
                plan.outputs.hints.insert(word_id.clone(), hints.clone());
                plan.items.push(WorkItem {
                    word_id,
                    key,
                    record: record.clone(),
                    kind: WorkKind::ExplanationOnly {
                        cached_hints: hints,
                    },
                });
            }
            Classification::NeedsGeneration => plan.items.push(WorkItem {
                word_id,
                key,
                record: record.clone(),
                kind: WorkKind::Full,
            }),
        }
    }

    debug!(
        cached = plan.cached_reused,
        pending = plan.items.len(),
        full = plan.full_items(),
        skipped = plan.skipped,
        "planned work"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = "m";
    const VERSION: &str = "v1";

    fn hints() -> Vec<String> {
        vec![
            "Definition: x".to_string(),
            "Fodder: N/A".to_string(),
            "Device: charade".to_string(),
        ]
    }

    fn explanation() -> Explanation {
        Explanation {
            device: "charade".into(),
            steps: vec!["1. a + b".into()],
            highlights: vec![],
        }
    }

    fn key_for(rec: &ClueRecord) -> String {
        cache_key(MODEL, VERSION, &rec.clue, &rec.answer)
    }

    #[test]
    fn three_way_classification() {
        let full = ClueRecord::new("1", "cached clue", "AAA");
        let half = ClueRecord::new("2", "hints only", "BBB");
        let fresh = ClueRecord::new("3", "new clue", "CCC");

        let cache = CacheStore::new("unused.json");
        cache.put(key_for(&full), CacheEntry::new(hints(), Some(explanation())));
        cache.put(key_for(&half), CacheEntry::new(hints(), None));

        let plan = plan(&[full, half, fresh], &cache, MODEL, VERSION);

        assert_eq!(plan.cached_reused, 1);
        assert_eq!(plan.outputs.explanations.len(), 1);
        assert_eq!(plan.outputs.hints.len(), 2);
        assert_eq!(plan.items.len(), 2);
        assert_eq!(plan.full_items(), 1);

        let half_item = plan.items.iter().find(|i| i.word_id == "2").unwrap();
        assert_eq!(
            half_item.kind,
            WorkKind::ExplanationOnly {
                cached_hints: hints()
            }
        );
        let fresh_item = plan.items.iter().find(|i| i.word_id == "3").unwrap();
        assert_eq!(fresh_item.kind, WorkKind::Full);
    }

    #[test]
    fn records_without_id_are_skipped() {
        let mut anon = ClueRecord::new("x", "clue", "ANS");
        anon.word_id = None;
        let blank = ClueRecord::new("", "clue", "ANS");

        let plan = plan(&[anon, blank], &CacheStore::new("unused.json"), MODEL, VERSION);
        assert_eq!(plan.skipped, 2);
        assert!(plan.items.is_empty());
    }

    #[test]
    fn duplicate_clue_answer_pairs_share_cache_content() {
        let a = ClueRecord::new("1a", "same clue", "SAME");
        let b = ClueRecord::new("9d", "same clue", "SAME");
        let cache = CacheStore::new("unused.json");
        cache.put(key_for(&a), CacheEntry::new(hints(), Some(explanation())));

        let plan = plan(&[a, b], &cache, MODEL, VERSION);
        assert_eq!(plan.cached_reused, 2);
        assert_eq!(plan.outputs.hints["1a"], plan.outputs.hints["9d"]);
    }

    #[test]
    fn other_model_misses() {
        let rec = ClueRecord::new("1", "clue", "ANS");
        let cache = CacheStore::new("unused.json");
        cache.put(key_for(&rec), CacheEntry::new(hints(), Some(explanation())));

        let plan = plan(&[rec], &cache, "other-model", VERSION);
        assert_eq!(plan.full_items(), 1);
    }
}
