//! Adapter interfaces for external systems.
//!
//! A transport turns one [`OutboundRequest`] into one [`ModelReply`] with a
//! single non-streaming round trip. Requests sent through a transport carry
//! user content (text and image bytes) to a third-party endpoint.

pub mod gemini;

use async_trait::async_trait;

use crate::config::ApiKey;
use crate::core::prompt::PromptStrategy;
use crate::domain::ImagePayload;
use crate::error::ServiceError;

// Re-export the Gemini transport
pub use gemini::GeminiTransport;

/// A fully composed generation request, independent of wire format
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// Model id, e.g. gemini-3-pro-preview
    pub model: String,

    /// Template that produced `prompt`
    pub strategy: PromptStrategy,

    /// User-facing prompt text (always the last content part)
    pub prompt: String,

    /// Optional inline image, sent before the prompt
    pub image: Option<ImagePayload>,

    /// Fixed instruction describing the JSON report schema
    pub system_instruction: String,

    /// Let the service ground claims against live web search
    pub search_grounding: bool,

    pub temperature: f32,
}

/// A citation exactly as the service reported it; either field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCitation {
    pub title: Option<String>,
    pub uri: Option<String>,
}

impl RawCitation {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            uri: Some(uri.into()),
        }
    }
}

/// Raw output of one model call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    /// Free-form reply text (may be empty)
    pub text: String,

    /// Grounding citations, unfiltered
    pub citations: Vec<RawCitation>,
}

impl ModelReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citations(mut self, citations: Vec<RawCitation>) -> Self {
        self.citations = citations;
        self
    }
}

/// Trait for model transports
#[async_trait]
pub trait ModelTransport: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Send the request and wait for the complete reply
    async fn generate(
        &self,
        request: &OutboundRequest,
        api_key: &ApiKey,
    ) -> Result<ModelReply, ServiceError>;
}
