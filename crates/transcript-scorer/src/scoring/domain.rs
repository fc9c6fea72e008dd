use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rubric::Dimension;

/// Transcript submitted for scoring, optionally with a prior video analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub video_analysis: Option<String>,
}

/// Dimension scores lifted out of the workflow payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_clarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructional_structure: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_value: Option<f64>,
}

impl SectionScores {
    /// Picks numeric dimension fields out of the payload; anything else is left empty.
    pub fn from_payload(payload: &Value) -> Self {
        let read = |dimension: Dimension| payload.get(dimension.key()).and_then(Value::as_f64);

        Self {
            total_score: read(Dimension::Total),
            content_clarity: read(Dimension::ContentClarity),
            instructional_structure: read(Dimension::InstructionalStructure),
            engagement: read(Dimension::Engagement),
            language: read(Dimension::Language),
            additional_value: read(Dimension::AdditionalValue),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Total => self.total_score,
            Dimension::ContentClarity => self.content_clarity,
            Dimension::InstructionalStructure => self.instructional_structure,
            Dimension::Engagement => self.engagement,
            Dimension::Language => self.language,
            Dimension::AdditionalValue => self.additional_value,
        }
    }
}

/// Scored transcript returned to callers, with validation notices attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: SectionScores,
    #[serde(default)]
    pub feedback: Option<String>,
    pub transcript: String,
    pub warnings: Vec<String>,
}

/// Raw video handed to the analysis backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
