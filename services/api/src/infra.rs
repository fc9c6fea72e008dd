use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use transcript_scorer::config::UpstreamConfig;
use transcript_scorer::error::AppError;
use transcript_scorer::integrations::{HttpScoringWorkflow, HttpVideoAnalyzer};
use transcript_scorer::scoring::TranscriptScoringService;

pub(crate) type LiveScoringService = TranscriptScoringService<HttpScoringWorkflow, HttpVideoAnalyzer>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the HTTP-backed upstream clients into a scoring service.
pub(crate) fn live_scoring_service(
    upstream: &UpstreamConfig,
) -> Result<Arc<LiveScoringService>, AppError> {
    let workflow = HttpScoringWorkflow::new(upstream)?;
    let video = HttpVideoAnalyzer::new(&upstream.video_analysis_url, upstream.timeout)?;

    Ok(Arc::new(TranscriptScoringService::new(
        Arc::new(workflow),
        Arc::new(video),
    )))
}
