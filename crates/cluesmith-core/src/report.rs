use std::fmt;

use serde::Serialize;

use crate::error::GenerationError;
use crate::model::Outputs;

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Clues that got fresh hints and a fresh explanation.
    pub generated: usize,
    /// Clues that kept cached hints and got a fresh explanation.
    pub explained: usize,
    /// Clues served entirely from the cache.
    pub cached_reused: usize,
    pub failed: usize,
    /// Records without a usable word id.
    pub skipped: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generated={} explained={} cached={} failed={} skipped={}",
            self.generated, self.explained, self.cached_reused, self.failed, self.skipped
        )
    }
}

/// A work item that produced no output this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub word_id: String,
    pub error: GenerationError,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outputs: Outputs,
    pub summary: RunSummary,
    pub failures: Vec<ItemFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line() {
        let s = RunSummary {
            generated: 3,
            explained: 1,
            cached_reused: 10,
            failed: 2,
            skipped: 0,
        };
        assert_eq!(
            s.to_string(),
            "generated=3 explained=1 cached=10 failed=2 skipped=0"
        );
    }
}
