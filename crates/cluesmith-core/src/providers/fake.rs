use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::ContentGenerator;
use crate::error::{GenerationError, GenerationResult};

type Responder = Box<dyn Fn(&str, &str) -> GenerationResult<String> + Send + Sync>;

/// Offline generator for tests and dry runs.
///
/// Serves queued responses first, then falls back to the responder, which
/// sees the system and user instructions of each call.
pub struct ScriptedGenerator {
    queue: Mutex<VecDeque<GenerationResult<String>>>,
    responder: Option<Responder>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gen = Self::new();
        for r in responses {
            gen.push(Ok(r.into()));
        }
        gen
    }

    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str) -> GenerationResult<String> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(f));
        self
    }

    pub fn push(&self, response: GenerationResult<String>) {
        self.queue
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(response);
    }

    /// Number of `generate` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// User instructions seen so far, in call order.
    pub fn user_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, system: &str, user: &str) -> GenerationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(user.to_string());

        let queued = self
            .queue
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        match (queued, &self.responder) {
            (Some(r), _) => r,
            (None, Some(f)) => f(system, user),
            (None, None) => Err(GenerationError::Transport {
                status: None,
                message: "no scripted response left".into(),
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
