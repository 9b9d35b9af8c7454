//! End-to-end run: clue list in, hint and explanation documents out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::config::PipelineConfig;
use crate::engine::Orchestrator;
use crate::error::{GenerationError, GenerationResult};
use crate::input::load_clues;
use crate::model::{ClueRecord, HintMap};
use crate::output::{write_map, WritePolicy};
use crate::planner::plan;
use crate::providers::{ContentGenerator, OpenAiGenerator};
use crate::replay::replay_from_cache;
use crate::report::{ItemFailure, RunReport, RunSummary};
use crate::retry::{RetryPolicy, RetryingProducer};

/// Where the two output documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub hints: PathBuf,
    pub explanations: PathBuf,
}

impl OutputPaths {
    pub fn new(hints: impl Into<PathBuf>, explanations: impl Into<PathBuf>) -> Self {
        Self {
            hints: hints.into(),
            explanations: explanations.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Provider available; outstanding work is generated.
    Live,
    /// No credential; outputs rebuilt from the cache only.
    Replay,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub mode: RunMode,
    pub summary: RunSummary,
    pub failures: Vec<ItemFailure>,
    /// Entries in the hints map produced this run.
    pub hint_count: usize,
    pub explanation_count: usize,
    pub wrote_hints: bool,
    pub wrote_explanations: bool,
    pub cache_entries: usize,
}

pub struct Pipeline {
    config: PipelineConfig,
    generator: Option<Arc<dyn ContentGenerator>>,
}

impl Pipeline {
    /// A pipeline without a provider; runs in replay mode.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            generator: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Attach the OpenAI-compatible provider when a credential is configured.
    ///
    /// A missing credential is not an error: the pipeline falls back to
    /// replay mode.
    pub fn from_config(config: PipelineConfig) -> GenerationResult<Self> {
        match OpenAiGenerator::from_config(&config) {
            Ok(gen) => Ok(Self::new(config).with_generator(Arc::new(gen))),
            Err(GenerationError::Config { message }) if config.api_key.is_none() => {
                info!(reason = %message, "no provider credential, replaying from cache");
                Ok(Self::new(config))
            }
            Err(e) => Err(e),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn mode(&self) -> RunMode {
        if self.generator.is_some() {
            RunMode::Live
        } else {
            RunMode::Replay
        }
    }

    /// Plan and execute against an in-memory cache. Does not persist anything.
    pub async fn run(&self, records: &[ClueRecord], cache: &CacheStore) -> RunReport {
        let Some(generator) = &self.generator else {
            let (outputs, summary) = replay_from_cache(
                records,
                cache,
                &self.config.model,
                &self.config.prompt_version,
            );
            return RunReport {
                outputs,
                summary,
                failures: Vec::new(),
            };
        };

        let planned = plan(
            records,
            cache,
            &self.config.model,
            &self.config.prompt_version,
        );
        let producer =
            RetryingProducer::new(generator.clone(), RetryPolicy::from_config(&self.config));
        Orchestrator::new(producer, self.config.effective_concurrency())
            .execute(planned, cache)
            .await
    }

    /// Full file-to-file run.
    ///
    /// Fails only when the clue list cannot be read or no output document
    /// could be written; per-clue failures are reported in the outcome.
    pub async fn run_files(
        &self,
        input: &Path,
        outputs: &OutputPaths,
    ) -> GenerationResult<PipelineOutcome> {
        let records = load_clues(input).await?;
        let cache = CacheStore::load(&self.config.cache_file).await;

        if self.generator.is_none() {
            let report = self.run(&records, &cache).await;
            let wrote_hints = write_map(
                &outputs.hints,
                &report.outputs.hints,
                WritePolicy::PreserveExisting,
            )
            .await?;
            let wrote_explanations = write_map(
                &outputs.explanations,
                &report.outputs.explanations,
                WritePolicy::PreserveExisting,
            )
            .await?;
            info!(
                hints = report.outputs.hints.len(),
                explanations = report.outputs.explanations.len(),
                wrote_hints,
                wrote_explanations,
                "materialized outputs from cache"
            );
            return Ok(PipelineOutcome {
                mode: RunMode::Replay,
                summary: report.summary,
                failures: Vec::new(),
                hint_count: report.outputs.hints.len(),
                explanation_count: report.outputs.explanations.len(),
                wrote_hints,
                wrote_explanations,
                cache_entries: cache.len(),
            });
        }

        if records.is_empty() {
            write_map(&outputs.hints, &HintMap::new(), WritePolicy::Always).await?;
            info!("no clues found, wrote empty hints");
            return Ok(PipelineOutcome {
                mode: RunMode::Live,
                summary: RunSummary::default(),
                failures: Vec::new(),
                hint_count: 0,
                explanation_count: 0,
                wrote_hints: true,
                wrote_explanations: false,
                cache_entries: cache.len(),
            });
        }

        let report = self.run(&records, &cache).await;

        // Generated content reaches the cache even when an output write fails.
        if let Err(e) = cache.persist().await {
            warn!(error = %e, "failed to persist cache; generated content will be regenerated next run");
        }
        write_map(&outputs.hints, &report.outputs.hints, WritePolicy::Always).await?;
        write_map(
            &outputs.explanations,
            &report.outputs.explanations,
            WritePolicy::Always,
        )
        .await?;

        info!(
            summary = %report.summary,
            cache_entries = cache.len(),
            "run complete"
        );
        Ok(PipelineOutcome {
            mode: RunMode::Live,
            summary: report.summary,
            failures: report.failures,
            hint_count: report.outputs.hints.len(),
            explanation_count: report.outputs.explanations.len(),
            wrote_hints: true,
            wrote_explanations: true,
            cache_entries: cache.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_selects_replay() {
        let pipeline = Pipeline::from_config(PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.mode(), RunMode::Replay);

        let pipeline =
            Pipeline::from_config(PipelineConfig::default().with_api_key("sk-test")).unwrap();
        assert_eq!(pipeline.mode(), RunMode::Live);
    }

    #[test]
    fn blank_credential_is_a_config_error() {
        let mut config = PipelineConfig::default();
        config.api_key = Some("  ".into());
        let err = Pipeline::from_config(config);
        // A present-but-blank key is a misconfiguration, not an absent one.
        assert!(matches!(err, Err(GenerationError::Config { .. })));
    }
}
