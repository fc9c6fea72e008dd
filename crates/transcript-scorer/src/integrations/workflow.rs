use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::{IntegrationError, ScoringWorkflow};
use crate::config::UpstreamConfig;

const SERVICE: &str = "scoring workflow";
const API_KEY_HEADER: &str = "X-API-KEY";
const REJECTED_STATE: &str = "REJECTED";

/// Named string input passed to the workflow deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkflowInputKind,
    pub value: String,
}

impl WorkflowInput {
    pub fn string(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: WorkflowInputKind::String,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowInputKind {
    String,
}

#[derive(Debug, Serialize)]
struct ExecuteWorkflowRequest<'a> {
    workflow_deployment_name: &'a str,
    release_tag: &'a str,
    inputs: &'a [WorkflowInput],
}

#[derive(Debug, Deserialize)]
struct WorkflowEnvelope {
    data: WorkflowData,
}

#[derive(Debug, Deserialize)]
struct WorkflowData {
    state: String,
    #[serde(default)]
    outputs: Vec<WorkflowOutput>,
    #[serde(default)]
    error: Option<WorkflowFailure>,
}

#[derive(Debug, Deserialize)]
struct WorkflowOutput {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WorkflowFailure {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the hosted workflow-execution API.
#[derive(Clone)]
pub struct HttpScoringWorkflow {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    deployment: String,
    release_tag: String,
}

impl HttpScoringWorkflow {
    pub fn new(config: &UpstreamConfig) -> Result<Self, IntegrationError> {
        if config.workflow_api_key.is_none() {
            warn!("SCORING_WORKFLOW_API_KEY is not set; workflow calls will be unauthenticated");
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            endpoint: config.workflow_url.clone(),
            api_key: config.workflow_api_key.clone(),
            deployment: config.workflow_deployment.clone(),
            release_tag: config.workflow_release_tag.clone(),
        })
    }
}

impl ScoringWorkflow for HttpScoringWorkflow {
    async fn execute(&self, inputs: Vec<WorkflowInput>) -> Result<Value, IntegrationError> {
        let request = ExecuteWorkflowRequest {
            workflow_deployment_name: &self.deployment,
            release_tag: &self.release_tag,
            inputs: &inputs,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.header(API_KEY_HEADER, key);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;

        interpret_workflow_response(status, &body)
    }
}

fn transport(err: reqwest::Error) -> IntegrationError {
    IntegrationError::Transport {
        service: SERVICE,
        message: err.to_string(),
    }
}

/// Unwraps the execution envelope and decodes the first output as the scoring payload.
pub fn interpret_workflow_response(status: u16, body: &[u8]) -> Result<Value, IntegrationError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| value.get("detail").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        error!(status, %detail, "scoring workflow request failed");
        return Err(IntegrationError::Upstream(format!(
            "scoring workflow returned HTTP {status}: {detail}"
        )));
    }

    let envelope: WorkflowEnvelope =
        serde_json::from_slice(body).map_err(|_| IntegrationError::NotJson { service: SERVICE })?;
    let WorkflowData {
        state,
        outputs,
        error: failure,
    } = envelope.data;

    if state == REJECTED_STATE {
        let message = failure
            .and_then(|failure| failure.message)
            .unwrap_or_else(|| "Workflow execution rejected".to_string());
        error!(%message, "scoring workflow rejected the request");
        return Err(IntegrationError::Rejected(message));
    }

    let output = outputs
        .into_iter()
        .next()
        .ok_or(IntegrationError::MissingOutput)?;

    match output.value {
        Value::String(raw) => serde_json::from_str(&raw)
            .map_err(|err| IntegrationError::MalformedOutput(err.to_string())),
        _ => Ok(json!({})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_serialize_with_string_type_tag() {
        let input = WorkflowInput::string("job_video", "");
        let encoded = serde_json::to_value(&input).expect("input serializes");
        assert_eq!(
            encoded,
            json!({ "name": "job_video", "type": "STRING", "value": "" })
        );
    }

    #[test]
    fn fulfilled_execution_decodes_string_output() {
        let body = json!({
            "execution_id": "exec-1",
            "data": {
                "state": "FULFILLED",
                "outputs": [
                    { "type": "STRING", "name": "final-output", "value": "{\"totalScore\": 85}" }
                ]
            }
        });
        let payload = interpret_workflow_response(200, body.to_string().as_bytes())
            .expect("payload decodes");
        assert_eq!(payload, json!({ "totalScore": 85 }));
    }

    #[test]
    fn non_string_output_becomes_empty_object() {
        let body = json!({
            "data": { "state": "FULFILLED", "outputs": [ { "value": { "totalScore": 85 } } ] }
        });
        let payload =
            interpret_workflow_response(200, body.to_string().as_bytes()).expect("payload");
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn rejected_execution_surfaces_message() {
        let body = json!({
            "data": { "state": "REJECTED", "error": { "message": "Input job_description is required" } }
        });
        let err = interpret_workflow_response(200, body.to_string().as_bytes())
            .expect_err("rejected");
        assert_eq!(
            err,
            IntegrationError::Rejected("Input job_description is required".to_string())
        );

        let body = json!({ "data": { "state": "REJECTED" } });
        let err = interpret_workflow_response(200, body.to_string().as_bytes())
            .expect_err("rejected");
        assert_eq!(err.to_string(), "Workflow execution rejected");
    }

    #[test]
    fn malformed_output_and_missing_outputs_are_errors() {
        let body = json!({ "data": { "state": "FULFILLED", "outputs": [ { "value": "not json" } ] } });
        let err = interpret_workflow_response(200, body.to_string().as_bytes())
            .expect_err("malformed");
        assert!(matches!(err, IntegrationError::MalformedOutput(_)));

        let body = json!({ "data": { "state": "FULFILLED", "outputs": [] } });
        let err = interpret_workflow_response(200, body.to_string().as_bytes())
            .expect_err("no outputs");
        assert_eq!(err, IntegrationError::MissingOutput);
    }

    #[test]
    fn http_failure_includes_detail() {
        let err = interpret_workflow_response(403, br#"{"detail":"Invalid API key"}"#)
            .expect_err("forbidden");
        assert_eq!(
            err.to_string(),
            "scoring workflow returned HTTP 403: Invalid API key"
        );
    }
}
