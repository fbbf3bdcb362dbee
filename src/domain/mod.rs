//! Domain types for truthlens.
//!
//! This module contains the core data structures:
//! - Request: One user submission (text and/or image)
//! - Analysis: The structured report and the envelope returned to callers
//! - Session: Front-end state with pure transitions

pub mod analysis;
pub mod request;
pub mod session;

// Re-export commonly used types
pub use analysis::{
    AnalysisReport, AnalysisResult, CredibilityBand, DetectedTechnique, GroundingSource,
    ReportStatus, Verdict,
};
pub use request::{
    image_media_type_for_extension, AnalysisRequest, ImagePayload, MAX_INPUT_CHARS,
    SUPPORTED_IMAGE_TYPES,
};
pub use session::{InputMode, Phase, Session, SessionError, Ticket};
