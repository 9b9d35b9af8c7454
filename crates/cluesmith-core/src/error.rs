//! Error types for the generation pipeline.

/// Pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Network failure or non-success response from the provider.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Response could not be parsed into the required shape.
    #[error("format error: {message}")]
    Format { message: String },

    /// Response discloses the answer.
    #[error("leakage: {field} reveals the answer")]
    Leakage { field: String },

    /// Required configuration is missing and has no safe default.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Every attempt of a retried call failed.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },

    /// Reading or writing a local document failed.
    #[error("io error on {path}: {message}")]
    Io { path: String, message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl GenerationError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn leakage(field: impl Into<String>) -> Self {
        Self::Leakage {
            field: field.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Format { .. } | Self::Leakage { .. }
        )
    }

    /// Whether the failure came from validating a response rather than fetching it.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Leakage { .. })
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classes() {
        assert!(GenerationError::format("bad").is_retryable());
        assert!(GenerationError::leakage("hint 1").is_retryable());
        assert!(GenerationError::Transport {
            status: Some(500),
            message: "boom".into()
        }
        .is_retryable());
        assert!(!GenerationError::config("no key").is_retryable());
    }

    #[test]
    fn exhausted_names_last_failure() {
        let err = GenerationError::Exhausted {
            attempts: 2,
            last: Box::new(GenerationError::leakage("step 2")),
        };
        let msg = err.to_string();
        assert!(msg.contains("2 attempt"));
        assert!(msg.contains("step 2 reveals the answer"));
    }

    #[test]
    fn transport_display_includes_status() {
        let err = GenerationError::Transport {
            status: Some(429),
            message: "slow down".into(),
        };
        assert_eq!(err.to_string(), "transport error (status 429): slow down");
    }
}
