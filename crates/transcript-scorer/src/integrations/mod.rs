//! Outbound adapters for the video-analysis backend and the scoring workflow.
//!
//! Both services are reached over HTTP with `reqwest`. Response interpretation
//! lives in plain functions so it can be exercised without a network.

use std::future::Future;

use serde_json::Value;

use crate::scoring::VideoUpload;

pub mod video;
pub mod workflow;

pub use video::HttpVideoAnalyzer;
pub use workflow::{HttpScoringWorkflow, WorkflowInput};

/// Failure talking to an upstream service, rendered as one user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrationError {
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    #[error("Expected JSON response from {service}")]
    NotJson { service: &'static str },
    #[error("{0}")]
    Upstream(String),
    #[error("No video description received")]
    MissingDescription,
    #[error("{0}")]
    Rejected(String),
    #[error("scoring workflow returned no outputs")]
    MissingOutput,
    #[error("scoring workflow output is not valid JSON: {0}")]
    MalformedOutput(String),
}

/// Turns an uploaded video into a text description.
pub trait VideoAnalyzer: Send + Sync {
    fn describe(
        &self,
        upload: VideoUpload,
    ) -> impl Future<Output = Result<String, IntegrationError>> + Send;
}

/// Runs the scoring workflow and returns its (unvalidated) JSON payload.
pub trait ScoringWorkflow: Send + Sync {
    fn execute(
        &self,
        inputs: Vec<WorkflowInput>,
    ) -> impl Future<Output = Result<Value, IntegrationError>> + Send;
}
