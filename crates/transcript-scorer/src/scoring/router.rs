use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{ScoreRequest, ScoreResponse, VideoUpload};
use super::service::{ScoringError, TranscriptScoringService};
use crate::error::AppError;
use crate::integrations::{ScoringWorkflow, VideoAnalyzer};

/// Upper bound on an uploaded video, well above the default JSON body limit.
pub const MAX_VIDEO_BYTES: usize = 512 * 1024 * 1024;
const VIDEO_FIELD: &str = "video";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAnalysisResponse {
    pub description: String,
}

/// Router builder exposing the scoring and video-analysis relay endpoints.
pub fn scoring_router<W, V>(service: Arc<TranscriptScoringService<W, V>>) -> Router
where
    W: ScoringWorkflow + 'static,
    V: VideoAnalyzer + 'static,
{
    Router::new()
        .route("/api/v1/score-transcript", post(score_handler::<W, V>))
        .route(
            "/api/v1/process-video",
            post(process_video_handler::<W, V>).layer(DefaultBodyLimit::max(MAX_VIDEO_BYTES)),
        )
        .with_state(service)
}

pub(crate) async fn score_handler<W, V>(
    State(service): State<Arc<TranscriptScoringService<W, V>>>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError>
where
    W: ScoringWorkflow + 'static,
    V: VideoAnalyzer + 'static,
{
    let response = service.score(request).await?;
    Ok(Json(response))
}

pub(crate) async fn process_video_handler<W, V>(
    State(service): State<Arc<TranscriptScoringService<W, V>>>,
    mut multipart: Multipart,
) -> Result<Json<VideoAnalysisResponse>, AppError>
where
    W: ScoringWorkflow + 'static,
    V: VideoAnalyzer + 'static,
{
    let upload = read_video_field(&mut multipart)
        .await
        .map_err(|err| AppError::InvalidInput(err.body_text()))?
        .ok_or(ScoringError::MissingVideo)?;

    let description = service.analyze_video(upload).await?;
    Ok(Json(VideoAnalysisResponse { description }))
}

async fn read_video_field(multipart: &mut Multipart) -> Result<Option<VideoUpload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or(VIDEO_FIELD).to_string();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await?.to_vec();

        return Ok(Some(VideoUpload {
            filename,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}
