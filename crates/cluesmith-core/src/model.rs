//! Clue records, cache entries and the generated content shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Labels a hint may start with.
pub const HINT_LABELS: [&str; 9] = [
    "indicator",
    "fodder",
    "definition",
    "device",
    "structure",
    "surface",
    "grammar",
    "link",
    "position",
];

/// Number of hints produced per clue.
pub const HINTS_PER_CLUE: usize = 3;

/// Inclusive bounds on explanation step count.
pub const MIN_STEPS: usize = 1;
pub const MAX_STEPS: usize = 10;

/// One crossword clue with its ground-truth answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueRecord {
    /// Grid word identifier; records without one are ignored.
    #[serde(default, deserialize_with = "opaque_id")]
    pub word_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub clue: String,

    /// Never written to any output document.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub length: Enumeration,

    #[serde(default, deserialize_with = "null_as_default")]
    pub direction: Direction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<serde_json::Value>,
}

impl ClueRecord {
    pub fn new(word_id: impl Into<String>, clue: impl Into<String>, answer: impl Into<String>) -> Self {
        let answer = answer.into();
        Self {
            word_id: Some(word_id.into()),
            clue: clue.into(),
            length: Enumeration::Count(answer.chars().count() as u64),
            answer,
            direction: Direction::Unknown,
            number: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Identifier usable as an output key, if any.
    pub fn id(&self) -> Option<&str> {
        self.word_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Word ids arrive as strings or numbers depending on the puzzle source.
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Puzzle exports write `null` for fields they do not know.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Answer length as given by the puzzle: a letter count or a pattern like "3,4".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Enumeration {
    Count(u64),
    Pattern(String),
}

impl Default for Enumeration {
    fn default() -> Self {
        Self::Pattern(String::new())
    }
}

impl fmt::Display for Enumeration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Pattern(p) => f.write_str(p),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Across,
    Down,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Direction {
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Across => Some("across"),
            Self::Down => Some("down"),
            Self::Unknown => None,
        }
    }
}

/// Role a highlighted clue span plays in the wordplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightRole {
    Indicator,
    Fodder,
    Definition,
}

impl HighlightRole {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "indicator" => Some(Self::Indicator),
            "fodder" => Some(Self::Fodder),
            "definition" => Some(Self::Definition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub role: HighlightRole,
    pub text: String,
}

/// Step-by-step account of how the clue works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub device: String,
    pub steps: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

/// Cached generation result for one cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub hints: Vec<String>,

    #[serde(default)]
    pub explanation: Option<Explanation>,

    /// Unix seconds of the write.
    #[serde(default, alias = "timestamp")]
    pub ts: i64,
}

impl CacheEntry {
    pub fn new(hints: Vec<String>, explanation: Option<Explanation>) -> Self {
        Self {
            hints,
            explanation,
            ts: chrono::Utc::now().timestamp(),
        }
    }
}

/// word_id → labeled hints.
pub type HintMap = BTreeMap<String, Vec<String>>;

/// word_id → explanation.
pub type ExplanationMap = BTreeMap<String, Explanation>;

/// The pipeline's externally visible product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    pub hints: HintMap,
    pub explanations: ExplanationMap,
}

impl Outputs {
    pub fn is_empty(&self) -> bool {
        self.hints.is_empty() && self.explanations.is_empty()
    }
}

/// Top-level input document; fields other than `clues` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub clues: Vec<ClueRecord>,
}
