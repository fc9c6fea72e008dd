use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{ScoreResponse, SectionScores};

/// Project identifier, the creation time in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named group of scored transcripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub transcripts: Vec<TranscriptEntry>,
}

impl Project {
    pub fn transcript_count(&self) -> usize {
        self.transcripts.len()
    }
}

/// One scoring run recorded in a project's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_filename: Option<String>,
    pub score: SectionScores,
    #[serde(default)]
    pub feedback: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl TranscriptEntry {
    pub fn from_response(
        response: ScoreResponse,
        video_analysis: Option<String>,
        video_filename: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let ScoreResponse {
            score,
            feedback,
            transcript,
            warnings,
        } = response;

        Self {
            transcript,
            video_analysis: video_analysis.filter(|analysis| !analysis.trim().is_empty()),
            video_filename,
            score,
            feedback,
            timestamp,
            warnings,
        }
    }
}
