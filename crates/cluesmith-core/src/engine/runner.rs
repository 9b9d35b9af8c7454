use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::{GenerationError, GenerationResult};
use crate::model::{CacheEntry, Explanation};
use crate::planner::{WorkItem, WorkKind, WorkPlan};
use crate::report::{ItemFailure, RunReport, RunSummary};
use crate::retry::RetryingProducer;

/// Result of one dispatched work item.
struct Completion {
    word_id: String,
    key: String,
    fresh_hints: bool,
    result: GenerationResult<(Vec<String>, Explanation)>,
}

/// Runs work items on a fixed-width worker pool.
///
/// Workers never read the cache. Results are merged by the collecting loop in
/// arrival order, one key at a time; a failed item leaves both the cache and
/// the output maps untouched.
#[derive(Clone)]
pub struct Orchestrator {
    producer: RetryingProducer,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(producer: RetryingProducer, concurrency: usize) -> Self {
        Self {
            producer,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn execute(&self, plan: WorkPlan, cache: &CacheStore) -> RunReport {
        let WorkPlan {
            outputs,
            items,
            cached_reused,
            skipped,
        } = plan;

        let mut report = RunReport {
            outputs,
            summary: RunSummary {
                cached_reused,
                skipped,
                ..RunSummary::default()
            },
            failures: Vec::new(),
        };

        let total = items.len();
        if total == 0 {
            return report;
        }
        info!(items = total, concurrency = self.concurrency, "dispatching work");

        let sem = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set = JoinSet::new();
        let mut owners = HashMap::with_capacity(total);

        for item in items {
            let sem = sem.clone();
            let producer = self.producer.clone();
            let word_id = item.word_id.clone();
            let handle = join_set.spawn(async move {
                let fresh_hints = matches!(item.kind, WorkKind::Full);
                let result = match sem.acquire_owned().await {
                    Ok(_permit) => run_item(&producer, &item).await,
                    Err(e) => Err(GenerationError::Transport {
                        status: None,
                        message: format!("worker pool closed: {e}"),
                    }),
                };
                Completion {
                    word_id: item.word_id,
                    key: item.key,
                    fresh_hints,
                    result,
                }
            });
            owners.insert(handle.id(), word_id);
        }

        let mut done = 0usize;
        while let Some(joined) = join_set.join_next_with_id().await {
            done += 1;
            let completion = match joined {
                Ok((id, c)) => {
                    owners.remove(&id);
                    c
                }
                Err(e) => {
                    let word_id = owners
                        .remove(&e.id())
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!(word_id = %word_id, error = %e, "worker task aborted");
                    report.summary.failed += 1;
                    report.failures.push(ItemFailure {
                        word_id,
                        error: GenerationError::Transport {
                            status: None,
                            message: format!("join error: {e}"),
                        },
                    });
                    continue;
                }
            };
            self.merge(completion, cache, &mut report);
            debug!(done, total, "work item finished");
        }

        report
    }

    fn merge(&self, completion: Completion, cache: &CacheStore, report: &mut RunReport) {
        let Completion {
            word_id,
            key,
            fresh_hints,
            result,
        } = completion;

        match result {
            Ok((hints, explanation)) => {
                cache.put(key, CacheEntry::new(hints.clone(), Some(explanation.clone())));
                report.outputs.hints.insert(word_id.clone(), hints);
                report.outputs.explanations.insert(word_id, explanation);
                if fresh_hints {
                    report.summary.generated += 1;
                } else {
                    report.summary.explained += 1;
                }
            }
            Err(error) => {
                warn!(word_id = %word_id, error = %error, "generation failed, skipping clue");
                report.summary.failed += 1;
                report.failures.push(ItemFailure { word_id, error });
            }
        }
    }
}

/// Hints then explanation for a full item; explanation alone otherwise.
async fn run_item(
    producer: &RetryingProducer,
    item: &WorkItem,
) -> GenerationResult<(Vec<String>, Explanation)> {
    match &item.kind {
        WorkKind::Full => {
            let hints = producer.hints(&item.record).await?;
            let explanation = producer.explanation(&item.record).await?;
            Ok((hints, explanation))
        }
        WorkKind::ExplanationOnly { cached_hints } => {
            let explanation = producer.explanation(&item.record).await?;
            Ok((cached_hints.clone(), explanation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache_key;
    use crate::model::ClueRecord;
    use crate::planner::plan;
    use crate::prompt::HINT_SYSTEM_PROMPT;
    use crate::providers::{ContentGenerator, ScriptedGenerator};
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const MODEL: &str = "m";
    const VERSION: &str = "v1";

    fn clue_of(user: &str) -> String {
        user.lines()
            .next()
            .and_then(|l| l.strip_prefix("Clue: "))
            .unwrap_or_default()
            .to_string()
    }

    fn respond(system: &str, user: &str) -> GenerationResult<String> {
        let clue = clue_of(user);
        if clue.starts_with("leaky") {
            return Ok(r#"["Definition: SECRET", "Fodder: N/A", "Device: anagram"]"#.into());
        }
        if system == HINT_SYSTEM_PROMPT {
            Ok(serde_json::json!([
                format!("Definition: about {clue}"),
                "Fodder: N/A",
                "Device: charade"
            ])
            .to_string())
        } else {
            Ok(serde_json::json!({
                "device": "charade",
                "steps": [format!("1. read '{clue}'")],
                "highlights": [{"role": "definition", "text": clue}]
            })
            .to_string())
        }
    }

    /// Sleeps a per-clue amount so completion order differs from dispatch order.
    struct StaggeredGenerator {
        reverse: bool,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl StaggeredGenerator {
        fn new(reverse: bool) -> Self {
            Self {
                reverse,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for StaggeredGenerator {
        async fn generate(&self, system: &str, user: &str) -> GenerationResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let n: u64 = clue_of(user)
                .trim_start_matches("clue ")
                .parse()
                .unwrap_or(0);
            let ms = if self.reverse { 20 - n } else { n };
            tokio::time::sleep(Duration::from_millis(ms)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            respond(system, user)
        }

        fn provider_name(&self) -> &'static str {
            "staggered"
        }
    }

    fn records(n: usize) -> Vec<ClueRecord> {
        (0..n)
            .map(|i| ClueRecord::new(format!("{i}-across"), format!("clue {i}"), format!("ANS{i}")))
            .collect()
    }

    fn orchestrator(gen: Arc<dyn ContentGenerator>, width: usize) -> Orchestrator {
        Orchestrator::new(
            RetryingProducer::new(gen, RetryPolicy::new(2, Duration::ZERO)),
            width,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn completion_order_does_not_change_outputs() {
        let recs = records(12);

        let mut results = Vec::new();
        for (reverse, width) in [(false, 1), (false, 8), (true, 8)] {
            let cache = CacheStore::new("unused.json");
            let gen = Arc::new(StaggeredGenerator::new(reverse));
            let report = orchestrator(gen, width)
                .execute(plan(&recs, &cache, MODEL, VERSION), &cache)
                .await;
            assert_eq!(report.summary.generated, 12);
            assert_eq!(cache.len(), 12);
            results.push(report.outputs);
        }

        assert_eq!(results[0], results[1]);
        assert_eq!(results[1], results[2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pool_width_bounds_in_flight_calls() {
        let recs = records(16);
        let cache = CacheStore::new("unused.json");
        let gen = Arc::new(StaggeredGenerator::new(false));

        orchestrator(gen.clone(), 3)
            .execute(plan(&recs, &cache, MODEL, VERSION), &cache)
            .await;

        let peak = gen.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight {peak} exceeds pool width");
        assert!(peak >= 1);
    }

    #[tokio::test]
    async fn failed_item_is_isolated() {
        let mut recs = records(3);
        recs.push(ClueRecord::new("99-down", "leaky clue", "SECRET"));
        let cache = CacheStore::new("unused.json");
        let gen = Arc::new(ScriptedGenerator::new().with_responder(respond));

        let report = orchestrator(gen.clone(), 2)
            .execute(plan(&recs, &cache, MODEL, VERSION), &cache)
            .await;

        assert_eq!(report.summary.generated, 3);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.failures[0].word_id, "99-down");
        assert!(matches!(
            report.failures[0].error,
            GenerationError::Exhausted { .. }
        ));
        assert!(!report.outputs.hints.contains_key("99-down"));
        assert!(!report.outputs.explanations.contains_key("99-down"));
        assert!(!cache.contains(&cache_key(MODEL, VERSION, "leaky clue", "SECRET")));
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn explanation_only_keeps_cached_hints() {
        let rec = ClueRecord::new("5", "clue 5", "ANS5");
        let key = cache_key(MODEL, VERSION, &rec.clue, &rec.answer);
        let stale = vec!["not even labeled".to_string()];

        let cache = CacheStore::new("unused.json");
        cache.put(key.clone(), CacheEntry::new(stale.clone(), None));
        let gen = Arc::new(ScriptedGenerator::new().with_responder(respond));

        let report = orchestrator(gen.clone(), 4)
            .execute(plan(&[rec], &cache, MODEL, VERSION), &cache)
            .await;

        assert_eq!(report.summary.explained, 1);
        assert_eq!(gen.calls(), 1, "only the explanation is generated");
        assert_eq!(report.outputs.hints["5"], stale);
        let entry = cache.get(&key).unwrap();
        assert_eq!(entry.hints, stale);
        assert!(entry.explanation.is_some());
    }

    #[tokio::test]
    async fn explanation_failure_after_fresh_hints_writes_nothing() {
        let rec = ClueRecord::new("7", "clue 7", "ANS7");
        let gen = Arc::new(ScriptedGenerator::with_responses([
            r#"["Definition: d", "Fodder: N/A", "Device: charade"]"#,
            "not json",
            "still not json",
        ]));
        let cache = CacheStore::new("unused.json");

        let report = orchestrator(gen, 1)
            .execute(plan(&[rec], &cache, MODEL, VERSION), &cache)
            .await;

        assert_eq!(report.summary.failed, 1);
        assert!(report.outputs.is_empty());
        assert!(cache.is_empty());
    }

    struct PanickingGenerator;

    #[async_trait]
    impl ContentGenerator for PanickingGenerator {
        async fn generate(&self, system: &str, user: &str) -> GenerationResult<String> {
            if clue_of(user) == "clue 1" {
                panic!("provider blew up");
            }
            respond(system, user)
        }

        fn provider_name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn panicked_worker_is_reported_under_its_word_id() {
        let recs = records(3);
        let cache = CacheStore::new("unused.json");

        let report = orchestrator(Arc::new(PanickingGenerator), 2)
            .execute(plan(&recs, &cache, MODEL, VERSION), &cache)
            .await;

        assert_eq!(report.summary.generated, 2);
        assert_eq!(report.summary.failed, 1);
        assert_eq!(report.failures[0].word_id, "1-across");
        assert!(!report.outputs.hints.contains_key("1-across"));
    }

    #[tokio::test]
    async fn empty_plan_makes_no_calls() {
        let gen = Arc::new(ScriptedGenerator::new());
        let cache = CacheStore::new("unused.json");
        let report = orchestrator(gen.clone(), 4)
            .execute(WorkPlan::default(), &cache)
            .await;
        assert_eq!(gen.calls(), 0);
        assert_eq!(report.summary, RunSummary::default());
    }
}
