//! Output reconstruction from the cache alone, used when no provider
//! credential is configured.

use crate::cache::CacheStore;
use crate::model::{ClueRecord, Outputs};
use crate::planner::plan;
use crate::report::RunSummary;

/// Every cached hint triple and explanation for `records`; no generation.
pub fn replay_from_cache(
    records: &[ClueRecord],
    cache: &CacheStore,
    model: &str,
    prompt_version: &str,
) -> (Outputs, RunSummary) {
    let plan = plan(records, cache, model, prompt_version);
    let summary = RunSummary {
        cached_reused: plan.cached_reused,
        skipped: plan.skipped,
        ..RunSummary::default()
    };
    (plan.outputs, summary)
}
