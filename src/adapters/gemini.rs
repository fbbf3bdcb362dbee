//! Gemini REST transport.
//!
//! Endpoint: POST {api_base}/models/{model}:generateContent
//! Auth: `x-goog-api-key` header

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{ModelReply, ModelTransport, OutboundRequest, RawCitation};
use crate::config::{ApiKey, ModelSettings};
use crate::error::ServiceError;

/// Longest slice of an error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Gemini `generateContent` client
pub struct GeminiTransport {
    api_base: String,
    request_timeout: Option<Duration>,
    client: reqwest::Client,
}

/// Request body for `generateContent`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentBody {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
}

impl GenerateContentBody {
    /// Map a composed request onto the Gemini wire shape.
    ///
    /// The image (if any) comes first, the prompt text is always the last part.
    pub fn from_request(request: &OutboundRequest) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = request.image.as_ref() {
            parts.push(Part::Inline {
                inline_data: InlineData {
                    mime_type: image.media_type.clone(),
                    data: image.to_base64(),
                },
            });
        }
        parts.push(Part::Text {
            text: request.prompt.clone(),
        });

        let tools = if request.search_grounding {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: request.system_instruction.clone(),
                }],
            },
            tools,
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        }
    }

    /// Replace inline image data with a size marker (for display)
    pub fn elide_inline_data(mut self) -> Self {
        for content in &mut self.contents {
            for part in &mut content.parts {
                if let Part::Inline { inline_data } = part {
                    inline_data.data = format!("<{} base64 chars elided>", inline_data.data.len());
                }
            }
        }
        self
    }
}

impl GeminiTransport {
    /// Create a new transport
    pub fn new(api_base: impl Into<String>, request_timeout: Option<Duration>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            request_timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved model settings
    pub fn from_settings(settings: &ModelSettings) -> Self {
        Self::new(settings.api_base.clone(), settings.request_timeout)
    }

    /// Build the generateContent URL for a model
    fn endpoint(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{}", trimmed)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

/// Extract reply text and citations from a generateContent response.
///
/// Reads leniently: anything missing or of the wrong type is treated as
/// absent rather than an error.
pub fn reply_from_payload(payload: &Value) -> ModelReply {
    let candidate = payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first());

    let Some(candidate) = candidate else {
        return ModelReply::default();
    };

    let text = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter(|part| !part.get("thought").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();

    let citations = candidate
        .pointer("/groundingMetadata/groundingChunks")
        .and_then(Value::as_array)
        .map(|chunks| {
            chunks
                .iter()
                .map(|chunk| {
                    let web = chunk.get("web");
                    RawCitation {
                        title: web
                            .and_then(|w| w.get("title"))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        uri: web
                            .and_then(|w| w.get("uri"))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    ModelReply { text, citations }
}

/// Pull `error.message` out of an error body, falling back to the raw body
fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = message.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", truncated)
    } else {
        message
    }
}

#[async_trait]
impl ModelTransport for GeminiTransport {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        request: &OutboundRequest,
        api_key: &ApiKey,
    ) -> Result<ModelReply, ServiceError> {
        let endpoint = self.endpoint(&request.model);
        let body = GenerateContentBody::from_request(request);

        let mut builder = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", api_key.expose())
            .json(&body);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(ServiceError::Transport)?;
        let status = response.status();
        let text = response.text().await.map_err(ServiceError::Transport)?;
        debug!(status = status.as_u16(), bytes = text.len(), "Gemini response received");

        if !status.is_success() {
            return Err(ServiceError::from_status(
                status.as_u16(),
                error_message(&text),
            ));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        Ok(reply_from_payload(&payload))
    }
}
