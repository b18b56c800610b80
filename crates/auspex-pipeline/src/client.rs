use async_trait::async_trait;
use auspex_models::config::{CallShape, ClientConfig};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::ClientError;

/// One segment of a structured completion reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSegment {
    pub kind: String,
    pub text: Option<String>,
}

/// Reply content from a completion call: either a plain string or an ordered
/// list of typed segments.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyContent {
    Text(String),
    Segments(Vec<ContentSegment>),
}

impl ReplyContent {
    /// Collapse the reply to plain text. Segment text values are concatenated
    /// in order, joined by newlines; segments without text are skipped.
    pub fn into_text(self) -> String {
        match self {
            ReplyContent::Text(text) => text,
            ReplyContent::Segments(segments) => segments
                .into_iter()
                .filter_map(|segment| segment.text.filter(|t| !t.is_empty()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Abstraction over the LLM completion call used by batch analysis and
/// reconciliation. Whether the client speaks the single-shot response surface
/// or the conversational chat surface is a capability of the concrete client,
/// fixed at construction.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<ReplyContent, ClientError>;
}

/// HTTP completion client for the OpenAI API.
pub struct OpenAiClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    shape: CallShape,
}

impl OpenAiClient {
    pub fn new(config: &ClientConfig, api_key: String, model: String) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            shape: config.call_shape,
        })
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "completion API error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<ReplyContent, ClientError> {
        debug!(model = %self.model, shape = ?self.shape, "issuing completion call");
        match self.shape {
            CallShape::Responses => {
                let payload = json!({
                    "model": self.model,
                    "input": [
                        {"role": "system", "content": system},
                        {"role": "user", "content": user},
                    ],
                });
                let body = self.post("/responses", &payload).await?;
                parse_responses_body(&body)
            }
            CallShape::Chat => {
                let payload = json!({
                    "model": self.model,
                    "messages": [
                        {"role": "system", "content": system},
                        {"role": "user", "content": user},
                    ],
                    "response_format": {"type": "json_object"},
                });
                let body = self.post("/chat/completions", &payload).await?;
                parse_chat_body(&body)
            }
        }
    }
}

fn segments_from_array(items: &[Value]) -> Vec<ContentSegment> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| ContentSegment {
            kind: obj
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            text: obj.get("text").and_then(Value::as_str).map(str::to_string),
        })
        .collect()
}

/// Pull text segments out of a Responses API body (`output[].content[]`).
fn parse_responses_body(body: &Value) -> Result<ReplyContent, ClientError> {
    let output = body
        .get("output")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::Shape("missing output array".to_string()))?;

    let mut segments = Vec::new();
    for item in output {
        if let Some(content) = item.get("content").and_then(Value::as_array) {
            segments.extend(segments_from_array(content));
        }
    }
    Ok(ReplyContent::Segments(segments))
}

/// Pull the first choice's message content out of a Chat Completions body.
fn parse_chat_body(body: &Value) -> Result<ReplyContent, ClientError> {
    let content = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .ok_or_else(|| ClientError::Shape("missing message content".to_string()))?;

    match content {
        Value::String(text) => Ok(ReplyContent::Text(text.clone())),
        Value::Array(items) => Ok(ReplyContent::Segments(segments_from_array(items))),
        other => Ok(ReplyContent::Text(other.to_string())),
    }
}
