use serde::{Deserialize, Serialize};

pub const UNKNOWN_LANGUAGE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }
}

/// One timed span of a transcript. `id` is an ordering hint from the engine;
/// gaps and duplicates are tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    pub id: i64,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<Word>,
}

impl TranscriptionSegment {
    /// Trims `text` and clamps `end` so it never precedes `start`.
    pub fn new(id: i64, start: f64, end: f64, text: &str, words: Vec<Word>) -> Self {
        Self {
            id,
            start,
            end: end.max(start),
            text: text.trim().to_string(),
            words,
        }
    }
}

/// Engine-independent transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<TranscriptionSegment>,
    pub language: String,
    pub engine: String,
}

impl TranscriptionResult {
    /// Builds a result from engine output, filling the gaps engines leave:
    /// segments are stably ordered by start time, a blank `text` is rebuilt by
    /// joining segment texts with single spaces, and a blank `language`
    /// becomes `"unknown"`.
    pub fn assemble(
        text: Option<&str>,
        mut segments: Vec<TranscriptionSegment>,
        language: Option<&str>,
        engine: impl Into<String>,
    ) -> Self {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        };

        let language = match language.map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => UNKNOWN_LANGUAGE.to_string(),
        };

        Self {
            text,
            segments,
            language,
            engine: engine.into(),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.segments.windows(2).all(|w| w[0].start <= w[1].start)
    }
}
