use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Transcription engines known to the registry.
///
/// `Mock` never reaches the upload endpoint; it exists so the dispatch and
/// execution pipeline can run without a real engine installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[serde(rename = "whisperx")]
    WhisperX,
    Timestamped,
    Mock,
}

impl EngineKind {
    pub const PRODUCTION: [EngineKind; 2] = [EngineKind::WhisperX, EngineKind::Timestamped];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::WhisperX => "whisperx",
            EngineKind::Timestamped => "timestamped",
            EngineKind::Mock => "mock",
        }
    }

    pub fn is_production(&self) -> bool {
        Self::PRODUCTION.contains(self)
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whisperx" => Ok(EngineKind::WhisperX),
            "timestamped" => Ok(EngineKind::Timestamped),
            "mock" => Ok(EngineKind::Mock),
            other => Err(format!("Unknown engine: {}", other)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
