//! Reading the JSON files written by whisper-family command-line tools.
//!
//! Both shipped engines write `{segments: [{id, start, end, text, words?}],
//! text, language}`. Numbers may arrive as integers, floats, numeric strings
//! or null; everything is coerced to `f64` (null and absent become 0).

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::application::ports::TranscriptionError;
use crate::domain::{TranscriptionResult, TranscriptionSegment, Word};

#[derive(Debug, Default, Deserialize)]
pub struct RawTranscript {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub segments: Option<Vec<RawSegment>>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSegment {
    #[serde(default, deserialize_with = "lenient_number")]
    pub id: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub start: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub end: f64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub words: Option<Vec<RawWord>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawWord {
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub start: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub end: f64,
}

/// `{output_dir}/{audio stem}.json`
pub fn output_path(output_dir: &Path, audio_path: &Path) -> PathBuf {
    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}.json", stem))
}

pub async fn read_output(path: &Path, engine: &str) -> Result<TranscriptionResult, TranscriptionError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(TranscriptionError::OutputMissing(path.to_path_buf()));
        }
        Err(e) => {
            return Err(TranscriptionError::MalformedOutput(format!(
                "{}: {}",
                path.display(),
                e
            )));
        }
    };

    let raw: RawTranscript = serde_json::from_slice(&bytes).map_err(|e| {
        TranscriptionError::MalformedOutput(format!("{}: {}", path.display(), e))
    })?;

    Ok(normalize(raw, engine))
}

pub fn normalize(raw: RawTranscript, engine: &str) -> TranscriptionResult {
    let segments = raw
        .segments
        .unwrap_or_default()
        .into_iter()
        .map(|seg| {
            let words = seg
                .words
                .unwrap_or_default()
                .into_iter()
                .map(|w| Word::new(w.word.unwrap_or_default(), w.start, w.end))
                .collect();
            TranscriptionSegment::new(
                seg.id as i64,
                seg.start,
                seg.end,
                seg.text.as_deref().unwrap_or_default(),
                words,
            )
        })
        .collect();

    TranscriptionResult::assemble(
        raw.text.as_deref(),
        segments,
        raw.language.as_deref(),
        engine,
    )
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or_default()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid number {:?}: {}", s, e))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number, found {}",
            other
        ))),
    }
}
