//! Access to the external text generation capability.

use async_trait::async_trait;

use crate::error::GenerationResult;

pub mod fake;
pub mod openai;

pub use fake::ScriptedGenerator;
pub use openai::OpenAiGenerator;

/// One blocking round-trip to a text generation provider.
///
/// Implementations do not retry; callers own the retry policy.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Return the raw, unvalidated response text.
    async fn generate(&self, system: &str, user: &str) -> GenerationResult<String>;

    fn provider_name(&self) -> &'static str;
}
