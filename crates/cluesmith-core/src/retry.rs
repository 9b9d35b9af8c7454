//! Bounded retry around a (generate, validate) pair.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::model::{ClueRecord, Explanation};
use crate::prompt;
use crate::providers::ContentGenerator;
use crate::validate::{validate_explanation, validate_hints};

/// Attempt budget and flat pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

/// Produces validated content for a clue, retrying rejected responses.
///
/// A validation failure appends the reinforcement directive to the user
/// instruction before the next attempt; a transport failure retries the same
/// instruction. Nothing here touches the cache.
#[derive(Clone)]
pub struct RetryingProducer {
    generator: Arc<dyn ContentGenerator>,
    policy: RetryPolicy,
}

impl RetryingProducer {
    pub fn new(generator: Arc<dyn ContentGenerator>, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run up to `max_attempts` generate+validate rounds.
    pub async fn produce<T, V>(
        &self,
        system: &str,
        user: String,
        reinforcement: &str,
        validate: V,
    ) -> GenerationResult<T>
    where
        V: Fn(&str) -> GenerationResult<T>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut user = user;
        let mut last = None;

        for attempt in 1..=max_attempts {
            let outcome = match self.generator.generate(system, &user).await {
                Ok(raw) => validate(&raw),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => {
                    debug!(attempt, "response accepted");
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        error = %e,
                        attempt,
                        max_attempts,
                        provider = self.generator.provider_name(),
                        "response rejected"
                    );
                    if e.is_validation() {
                        user = prompt::reinforce(&user, reinforcement);
                    }
                    last = Some(e);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(GenerationError::Exhausted {
            attempts: max_attempts,
            last: Box::new(last.unwrap_or_else(|| GenerationError::format("no attempt was made"))),
        })
    }

    pub async fn hints(&self, record: &ClueRecord) -> GenerationResult<Vec<String>> {
        self.produce(
            prompt::HINT_SYSTEM_PROMPT,
            prompt::hint_user_prompt(record),
            prompt::HINT_REINFORCEMENT,
            |raw| validate_hints(raw, &record.answer),
        )
        .await
    }

    pub async fn explanation(&self, record: &ClueRecord) -> GenerationResult<Explanation> {
        self.produce(
            prompt::EXPLANATION_SYSTEM_PROMPT,
            prompt::explanation_user_prompt(record),
            prompt::EXPLANATION_REINFORCEMENT,
            |raw| validate_explanation(raw, &record.answer),
        )
        .await
    }
}
