//! truthlens - Credibility analysis backed by a search-grounded model
//!
//! Submits text and/or an image to the Gemini `generateContent` API with the
//! Google Search tool enabled, asks for a structured credibility report, and
//! returns the verdict, trust score, detected manipulation techniques and
//! grounding sources.
//!
//! # Privacy
//!
//! Every analysis sends the user's text and image bytes to a third-party
//! endpoint (Google's Generative Language API by default). Nothing is stored
//! locally and nothing is logged beyond sizes and the chosen prompt strategy.
//!
//! # Modules
//!
//! - `adapters`: Model transports (Gemini REST)
//! - `core`: Prompt selection, reply parsing, the `Analyzer` entry point
//! - `domain`: Data structures (requests, reports, session state)
//! - `config`: Layered configuration and the API key
//! - `cli`: Command-line front-end
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY=...
//!
//! # Analyze a claim
//! truthlens analyze "Scientists confirm chocolate cures insomnia"
//!
//! # Analyze a link (checked through search, never fetched directly)
//! truthlens analyze "https://news.example.com/story"
//!
//! # Analyze an image with context
//! truthlens analyze --image meme.png "Posted on a forum yesterday"
//!
//! # Preview the request without sending it
//! truthlens prompt --image meme.png
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;

// Re-export main types at crate root for convenience
pub use adapters::{GeminiTransport, ModelReply, ModelTransport, OutboundRequest, RawCitation};
pub use config::{ApiKey, ModelSettings, ResolvedConfig};
pub use crate::core::{Analyzer, PromptStrategy, RequestBuilder};
pub use domain::{
    AnalysisReport, AnalysisRequest, AnalysisResult, DetectedTechnique, GroundingSource,
    ImagePayload, ReportStatus, Session, Verdict,
};
pub use error::{AnalysisError, ServiceError};
