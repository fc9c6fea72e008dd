//! Transcript scoring: rubric, payload validation, relay service, and HTTP routes.

pub mod domain;
pub mod router;
pub mod rubric;
pub mod service;
pub mod validation;

pub use domain::{ScoreRequest, ScoreResponse, SectionScores, VideoUpload};
pub use router::{scoring_router, VideoAnalysisResponse};
pub use rubric::{Dimension, ScoreStatus, ScoreValidationRule, SCORE_RULES};
pub use service::{workflow_inputs, ScoringError, TranscriptScoringService};
pub use validation::{validate_payload, ValidationReport};
