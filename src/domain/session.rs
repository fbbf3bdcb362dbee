//! Presentation state for one analysis front-end.
//!
//! A `Session` holds what the user has entered, whether an analysis is in
//! flight, and the last result or error. Transitions are plain methods with
//! no I/O; the caller performs the analysis between `submit` and `complete`.
//!
//! There is no cancellation. A new submission supersedes the pending one,
//! and a late completion carrying an old ticket is ignored.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::analysis::AnalysisReport;
use super::request::{AnalysisRequest, ImagePayload, MAX_INPUT_CHARS};

/// Lifecycle phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Which input the user is submitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Text,
    Image,
}

/// Identifies one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(Uuid);

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a submission was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Enter some text to analyze")]
    EmptyText,

    #[error("Select an image to analyze")]
    MissingImage,

    #[error("Input is too long: {chars} characters (limit {limit})")]
    InputTooLong { chars: usize, limit: usize },
}

/// Front-end state
#[derive(Debug, Clone, Default)]
pub struct Session {
    mode: InputMode,
    phase: Phase,
    text: String,
    image: Option<ImagePayload>,
    result: Option<AnalysisReport>,
    error_message: Option<String>,
    pending: Option<Ticket>,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImagePayload> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisReport> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Succeeded, but the reply carried no structured verdict
    pub fn is_without_verdict(&self) -> bool {
        self.phase == Phase::Success
            && self.result.as_ref().is_some_and(|report| !report.has_verdict())
    }

    /// Time between the last submission and its completion
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.submitted_at?)
    }

    /// Replace the text input and switch to text mode
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.mode = InputMode::Text;
    }

    /// Select an image and switch to image mode
    pub fn select_image(&mut self, image: ImagePayload) {
        self.image = Some(image);
        self.mode = InputMode::Image;
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    /// Validate the input and move to `Loading`.
    ///
    /// Clears any previous result and error. In text mode a selected image
    /// is not sent; in image mode the text goes along as context.
    pub fn submit(&mut self) -> Result<(Ticket, AnalysisRequest), SessionError> {
        let chars = self.text.chars().count();
        if chars > MAX_INPUT_CHARS {
            return Err(SessionError::InputTooLong {
                chars,
                limit: MAX_INPUT_CHARS,
            });
        }

        let image = match self.mode {
            InputMode::Text => {
                if self.text.trim().is_empty() {
                    return Err(SessionError::EmptyText);
                }
                None
            }
            InputMode::Image => Some(self.image.clone().ok_or(SessionError::MissingImage)?),
        };

        let ticket = Ticket(Uuid::new_v4());
        self.phase = Phase::Loading;
        self.result = None;
        self.error_message = None;
        self.pending = Some(ticket);
        self.submitted_at = Some(Utc::now());
        self.completed_at = None;

        Ok((ticket, AnalysisRequest::new(self.text.clone(), image)))
    }

    /// Apply the outcome of a submission.
    ///
    /// Returns `false` (and changes nothing) when the ticket is not the
    /// latest pending one.
    pub fn complete<E: std::fmt::Display>(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisReport, E>,
    ) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }

        self.pending = None;
        self.completed_at = Some(Utc::now());
        match outcome {
            Ok(report) => {
                self.phase = Phase::Success;
                self.result = Some(report);
            }
            Err(e) => {
                self.phase = Phase::Error;
                self.error_message = Some(e.to_string());
            }
        }
        true
    }

    /// Move to `Error` without sending anything (e.g. unsupported upload).
    ///
    /// Drops any previous result and timing along with the pending ticket.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.phase = Phase::Error;
        self.error_message = Some(message.into());
        self.result = None;
        self.pending = None;
        self.submitted_at = None;
        self.completed_at = None;
    }

    /// Back to a blank `Idle` session
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::ReportStatus;

    fn report() -> AnalysisReport {
        AnalysisReport {
            analysis: None,
            status: ReportStatus::Unavailable,
            sources: Vec::new(),
            raw_text: "plain reply".to_string(),
        }
    }

    #[test]
    fn test_text_mode_drops_image() {
        let mut session = Session::new();
        session.select_image(ImagePayload::new("image/png", vec![1]));
        session.set_text("claim");

        let (_, request) = session.submit().unwrap();
        assert!(request.image.is_none());
        assert_eq!(request.text, "claim");
    }

    #[test]
    fn test_image_mode_keeps_text_as_context() {
        let mut session = Session::new();
        session.set_text("caption");
        session.select_image(ImagePayload::new("image/png", vec![1]));

        let (_, request) = session.submit().unwrap();
        assert!(request.image.is_some());
        assert_eq!(request.text, "caption");
    }

    #[test]
    fn test_elapsed_is_recorded() {
        let mut session = Session::new();
        session.set_text("claim");
        assert!(session.elapsed().is_none());

        let (ticket, _) = session.submit().unwrap();
        session.complete::<String>(ticket, Ok(report()));
        assert!(session.elapsed().unwrap() >= chrono::Duration::zero());
        assert!(session.is_without_verdict());
    }
}
