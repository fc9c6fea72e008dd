use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_VIDEO_ANALYSIS_URL: &str = "http://localhost:8000";
const DEFAULT_WORKFLOW_URL: &str = "https://predict.vellum.ai/v1/execute-workflow";
const DEFAULT_WORKFLOW_DEPLOYMENT: &str = "hr-job-description";
const DEFAULT_WORKFLOW_RELEASE_TAG: &str = "LATEST";
const DEFAULT_STORE_PATH: &str = "data/projects.json";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let workflow_api_key = env::var("SCORING_WORKFLOW_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let upstream = UpstreamConfig {
            video_analysis_url: env::var("VIDEO_ANALYSIS_URL")
                .unwrap_or_else(|_| DEFAULT_VIDEO_ANALYSIS_URL.to_string()),
            workflow_url: env::var("SCORING_WORKFLOW_URL")
                .unwrap_or_else(|_| DEFAULT_WORKFLOW_URL.to_string()),
            workflow_api_key,
            workflow_deployment: env::var("SCORING_WORKFLOW_DEPLOYMENT")
                .unwrap_or_else(|_| DEFAULT_WORKFLOW_DEPLOYMENT.to_string()),
            workflow_release_tag: env::var("SCORING_WORKFLOW_RELEASE_TAG")
                .unwrap_or_else(|_| DEFAULT_WORKFLOW_RELEASE_TAG.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let storage = StorageConfig {
            projects_path: env::var("APP_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH)),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            upstream,
            storage,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Endpoints and credentials for the video-analysis backend and the scoring workflow.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub video_analysis_url: String,
    pub workflow_url: String,
    pub workflow_api_key: Option<String>,
    pub workflow_deployment: String,
    pub workflow_release_tag: String,
    pub timeout: Duration,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("video_analysis_url", &self.video_analysis_url)
            .field("workflow_url", &self.workflow_url)
            .field(
                "workflow_api_key",
                &self.workflow_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("workflow_deployment", &self.workflow_deployment)
            .field("workflow_release_tag", &self.workflow_release_tag)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Location of the local project history.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub projects_path: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidTimeout,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidTimeout => {
                write!(f, "UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
