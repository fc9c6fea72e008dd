use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, error, info};

use super::{IntegrationError, VideoAnalyzer};
use crate::scoring::VideoUpload;

const SERVICE: &str = "video analysis service";

/// Client for the video-analysis backend's `/process-video` endpoint.
#[derive(Debug, Clone)]
pub struct HttpVideoAnalyzer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVideoAnalyzer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, IntegrationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            endpoint: format!("{}/process-video", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl VideoAnalyzer for HttpVideoAnalyzer {
    async fn describe(&self, upload: VideoUpload) -> Result<String, IntegrationError> {
        info!(
            filename = %upload.filename,
            content_type = upload.content_type.as_deref().unwrap_or("unknown"),
            size = upload.bytes.len(),
            "sending video to analysis backend"
        );

        let mut part = Part::bytes(upload.bytes).file_name(upload.filename);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type).map_err(transport)?;
        }
        let form = Form::new().part("video", part);

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, mime::APPLICATION_JSON.as_ref())
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(transport)?;

        interpret_video_response(status, content_type.as_deref(), &body)
    }
}

fn transport(err: reqwest::Error) -> IntegrationError {
    IntegrationError::Transport {
        service: SERVICE,
        message: err.to_string(),
    }
}

pub(crate) fn is_json_content_type(raw: Option<&str>) -> bool {
    raw.and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|parsed| {
            parsed.type_() == mime::APPLICATION
                && (parsed.subtype() == mime::JSON || parsed.suffix() == Some(mime::JSON))
        })
}

/// Maps the backend's reply to a description or a single readable error.
pub fn interpret_video_response(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<String, IntegrationError> {
    if !is_json_content_type(content_type) {
        return Err(IntegrationError::NotJson { service: SERVICE });
    }

    let data: Value =
        serde_json::from_slice(body).map_err(|_| IntegrationError::NotJson { service: SERVICE })?;
    debug!(status, "video analysis response received");

    if !(200..300).contains(&status) {
        error!(status, body = %data, "video analysis backend error");
        let message = ["detail", "error"]
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str))
            .unwrap_or("Failed to process video");
        return Err(IntegrationError::Upstream(message.to_string()));
    }

    match data.get("description").and_then(Value::as_str) {
        Some(description) if !description.is_empty() => Ok(description.to_string()),
        _ => {
            error!(body = %data, "no description in video analysis response");
            Err(IntegrationError::MissingDescription)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_json_with_charset_parameter() {
        assert!(is_json_content_type(Some("application/json; charset=utf-8")));
        assert!(is_json_content_type(Some("application/problem+json")));
        assert!(!is_json_content_type(Some("text/html")));
        assert!(!is_json_content_type(None));
    }

    #[test]
    fn returns_description_on_success() {
        let body = br####"{"description":"### Content Clarity and Relevance\n- clear slides"}"####;
        let description =
            interpret_video_response(200, Some("application/json"), body).expect("description");
        assert!(description.starts_with("### Content Clarity"));
    }

    #[test]
    fn rejects_non_json_content_type() {
        let err = interpret_video_response(502, Some("text/html"), b"<html>bad gateway</html>")
            .expect_err("html is rejected");
        assert_eq!(
            err.to_string(),
            "Expected JSON response from video analysis service"
        );
    }

    #[test]
    fn prefers_detail_then_error_for_failed_status() {
        let err = interpret_video_response(
            422,
            Some("application/json"),
            br#"{"detail":"video field required","error":"ignored"}"#,
        )
        .expect_err("status is an error");
        assert_eq!(err, IntegrationError::Upstream("video field required".to_string()));

        let err = interpret_video_response(
            500,
            Some("application/json"),
            br#"{"error":"model quota exceeded"}"#,
        )
        .expect_err("status is an error");
        assert_eq!(err.to_string(), "model quota exceeded");

        let err = interpret_video_response(500, Some("application/json"), b"{}")
            .expect_err("status is an error");
        assert_eq!(err.to_string(), "Failed to process video");
    }

    #[test]
    fn missing_or_empty_description_is_an_error() {
        for body in [&br#"{}"#[..], &br#"{"description":""}"#[..]] {
            let err = interpret_video_response(200, Some("application/json"), body)
                .expect_err("description required");
            assert_eq!(err, IntegrationError::MissingDescription);
        }
    }

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = HttpVideoAnalyzer::new("http://localhost:8000/", Duration::from_secs(5))
            .expect("client builds");
        assert_eq!(client.endpoint(), "http://localhost:8000/process-video");
    }
}
