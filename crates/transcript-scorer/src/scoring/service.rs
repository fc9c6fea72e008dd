use std::sync::Arc;

use tracing::{error, info, warn};

use super::domain::{ScoreRequest, ScoreResponse, SectionScores, VideoUpload};
use super::validation::validate_payload;
use crate::integrations::{IntegrationError, ScoringWorkflow, VideoAnalyzer, WorkflowInput};

const PREVIEW_CHARS: usize = 100;
const NO_VIDEO_ANALYSIS: &str = "No video analysis available";

/// Service relaying transcripts and videos to the upstream services and
/// annotating the returned scores with validation notices.
pub struct TranscriptScoringService<W, V> {
    workflow: Arc<W>,
    video: Arc<V>,
}

impl<W, V> TranscriptScoringService<W, V>
where
    W: ScoringWorkflow + 'static,
    V: VideoAnalyzer + 'static,
{
    pub fn new(workflow: Arc<W>, video: Arc<V>) -> Self {
        Self { workflow, video }
    }

    /// Score a transcript. Validation problems never fail the call; they are
    /// returned in `warnings` next to the score.
    pub async fn score(&self, request: ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        let ScoreRequest {
            transcript,
            video_analysis,
        } = request;

        if transcript.trim().is_empty() {
            return Err(ScoringError::MissingTranscript);
        }

        let video_analysis = video_analysis
            .as_deref()
            .map(str::trim)
            .filter(|analysis| !analysis.is_empty());

        info!(
            transcript_preview = %preview(&transcript),
            video_preview = %video_analysis.map(preview).unwrap_or_else(|| "None".to_string()),
            transcript_length = transcript.chars().count(),
            video_length = video_analysis.map_or(0, |analysis| analysis.chars().count()),
            "sending transcript to scoring workflow"
        );

        let inputs = workflow_inputs(&transcript, video_analysis);
        let payload = self.workflow.execute(inputs).await?;

        let report = validate_payload(&payload);
        if !report.is_valid {
            error!(errors = ?report.errors, "scoring payload failed validation");
        }
        if !report.warnings.is_empty() {
            warn!(warnings = ?report.warnings, "scoring payload validation warnings");
        }

        let score = SectionScores::from_payload(&payload);
        let feedback = payload
            .get("explanation")
            .and_then(|value| value.as_str())
            .map(str::to_owned);

        Ok(ScoreResponse {
            score,
            feedback,
            transcript,
            warnings: report.into_notices(),
        })
    }

    /// Forward a video to the analysis backend and return its description.
    pub async fn analyze_video(&self, upload: VideoUpload) -> Result<String, ScoringError> {
        if upload.bytes.is_empty() {
            return Err(ScoringError::MissingVideo);
        }

        let description = self.video.describe(upload).await?;
        info!(description_preview = %preview(&description), "video analysis complete");
        Ok(description)
    }
}

/// Named inputs expected by the scoring workflow deployment.
pub fn workflow_inputs(transcript: &str, video_analysis: Option<&str>) -> Vec<WorkflowInput> {
    let transcript = transcript.trim();
    let video = video_analysis.map(str::trim).unwrap_or_default();
    let video_section = video_analysis
        .map(str::trim)
        .filter(|analysis| !analysis.is_empty())
        .unwrap_or(NO_VIDEO_ANALYSIS);

    vec![
        WorkflowInput::string("Video_Feedback", video),
        WorkflowInput::string(
            "feedback",
            format!("TRANSCRIPT:\n{transcript}\n\nVIDEO ANALYSIS:\n{video_section}"),
        ),
        WorkflowInput::string("job_description", format!("TRANSCRIPT CONTENT:\n{transcript}")),
        WorkflowInput::string("job_video", video),
        WorkflowInput::string("totalScore", "0"),
    ]
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Transcript is required")]
    MissingTranscript,
    #[error("Video file is required")]
    MissingVideo,
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}
