//! Hint and explanation generation for cryptic crossword clues.
//!
//! Given a clue list with ground-truth answers, this crate produces for every
//! clue three labeled, non-spoiling hints and a structured explanation, using
//! a chat-completion provider. Results are validated, cached by a content
//! hash, and replayed on later runs so unchanged clues are never regenerated.
//!
//! - Content-addressed cache keyed on model, prompt version, clue and answer
//! - Strict validation with answer-leak rejection and a reinforced retry
//! - Bounded worker pool; outputs independent of completion order
//! - Replay mode that rebuilds outputs from the cache without a credential
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use cluesmith_core::{OutputPaths, Pipeline, PipelineConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pipeline = Pipeline::from_config(PipelineConfig::from_env())?;
//! let outcome = pipeline
//!     .run_files(
//!         Path::new("game_data.json"),
//!         &OutputPaths::new("hints.json", "explanations.json"),
//!     )
//!     .await?;
//! println!("{}", outcome.summary);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `OPENAI_API_KEY` | Provider credential; without it the run replays from cache |
//! | `HINTS_MODEL` | Model name (fallback `OPENAI_MODEL`, default: `gpt-4o-mini`) |
//! | `HINTS_PROMPT_VERSION` | Prompt version tag (default: `v4-2025-08-31`) |
//! | `HINTS_CONCURRENCY` | Worker pool width (default: 10) |
//! | `HINTS_CACHE_FILE` | Cache path (default: `hints_cache.json`) |
//! | `OPENAI_API_URL` | Chat-completions endpoint |
//! | `HINTS_TEMPERATURE` | Sampling temperature (default: 0.7) |
//! | `HINTS_TIMEOUT` | Request timeout in seconds (default: 60) |

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod prompt;
pub mod providers;
pub mod replay;
pub mod report;
pub mod retry;
pub mod validate;

pub use cache::{cache_key, CacheStore};
pub use config::PipelineConfig;
pub use engine::Orchestrator;
pub use error::{GenerationError, GenerationResult};
pub use model::{
    CacheEntry, ClueRecord, Direction, Enumeration, Explanation, ExplanationMap, Highlight,
    HighlightRole, HintMap, Outputs,
};
pub use output::{write_map, WritePolicy};
pub use pipeline::{OutputPaths, Pipeline, PipelineOutcome, RunMode};
pub use planner::{plan, Classification, WorkItem, WorkKind, WorkPlan};
pub use providers::{ContentGenerator, OpenAiGenerator, ScriptedGenerator};
pub use replay::replay_from_cache;
pub use report::{ItemFailure, RunReport, RunSummary};
pub use retry::{RetryPolicy, RetryingProducer};
pub use validate::{validate_explanation, validate_hints};
