use crate::config::ConfigError;
use crate::integrations::IntegrationError;
use crate::projects::StoreError;
use crate::scoring::ScoringError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Scoring(ScoringError),
    Store(StoreError),
    InvalidInput(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Scoring(ScoringError::MissingTranscript | ScoringError::MissingVideo)
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Scoring(ScoringError::Integration(IntegrationError::Rejected(_))) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Store(StoreError::ProjectNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Scoring(ScoringError::Integration(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            // Relay failures are shown to end users as-is.
            AppError::Scoring(err) => write!(f, "{}", err),
            AppError::Store(err) => write!(f, "project store error: {}", err),
            AppError::InvalidInput(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::InvalidInput(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<IntegrationError> for AppError {
    fn from(value: IntegrationError) -> Self {
        Self::Scoring(ScoringError::Integration(value))
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
