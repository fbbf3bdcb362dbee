//! Extraction of the structured report from a model reply.
//!
//! The reply is free text that should embed a JSON report in a fenced
//! block. Extraction is a three-stage chain:
//! 1. the first ```` ```json ```` block
//! 2. the first fenced block with any (or no) language tag
//! 3. the whole reply text
//!
//! A fenced block that fails to decode yields the fallback report; a reply
//! with no fence that also fails to decode yields no report at all.
//! Grounding sources are extracted independently and never fail.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::adapters::{ModelReply, RawCitation};
use crate::domain::{AnalysisReport, AnalysisResult, GroundingSource, ReportStatus};

static JSON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\b\s*([\s\S]*?)\s*```").expect("valid regex"));

static ANY_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\w+-]*\s*([\s\S]*?)\s*```").expect("valid regex"));

/// Where the candidate report text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    /// A fence tagged `json`
    TaggedFence,
    /// A fence with some other tag or none
    AnyFence,
    /// No fence; the entire reply
    WholeText,
}

/// Outcome of decoding the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A report decoded successfully
    Parsed(AnalysisResult),
    /// A fenced block was found but did not decode
    Degraded { error: String },
    /// No fence, and the whole text did not decode
    Unavailable,
}

impl Extraction {
    pub fn status(&self) -> ReportStatus {
        match self {
            Extraction::Parsed(_) => ReportStatus::Parsed,
            Extraction::Degraded { .. } => ReportStatus::Degraded,
            Extraction::Unavailable => ReportStatus::Unavailable,
        }
    }

    /// The report to present: the decoded one, the fallback, or nothing
    pub fn into_analysis(self) -> Option<AnalysisResult> {
        match self {
            Extraction::Parsed(result) => Some(result),
            Extraction::Degraded { .. } => Some(AnalysisResult::fallback()),
            Extraction::Unavailable => None,
        }
    }
}

/// Locate the candidate report text in a reply
pub fn locate_block(text: &str) -> (BlockSource, &str) {
    if let Some(content) = JSON_FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        return (BlockSource::TaggedFence, content.as_str());
    }

    if let Some(content) = ANY_FENCE_RE.captures(text).and_then(|caps| caps.get(1)) {
        return (BlockSource::AnyFence, content.as_str());
    }

    (BlockSource::WholeText, text)
}

/// Decode the report embedded in a reply's text
pub fn extract_analysis(text: &str) -> Extraction {
    let (source, block) = locate_block(text);

    match serde_json::from_str::<AnalysisResult>(block) {
        Ok(result) => Extraction::Parsed(result),
        Err(e) if source == BlockSource::WholeText => {
            debug!(error = %e, "Reply is not a structured report");
            Extraction::Unavailable
        }
        Err(e) => Extraction::Degraded {
            error: e.to_string(),
        },
    }
}

/// Keep citations that have both a non-empty title and a non-empty URI
pub fn extract_sources(citations: &[RawCitation]) -> Vec<GroundingSource> {
    citations
        .iter()
        .filter_map(|citation| {
            let title = citation.title.as_deref().filter(|t| !t.is_empty())?;
            let uri = citation.uri.as_deref().filter(|u| !u.is_empty())?;
            Some(GroundingSource {
                title: title.to_string(),
                uri: uri.to_string(),
            })
        })
        .collect()
}

/// Turn a raw reply into the report handed back to the caller.
///
/// Pure: the same reply always yields the same report.
pub fn parse(reply: &ModelReply) -> AnalysisReport {
    let extraction = extract_analysis(&reply.text);
    let status = extraction.status();

    if let Extraction::Degraded { ref error } = extraction {
        warn!(%error, "Structured report could not be decoded, using fallback");
    }

    AnalysisReport {
        analysis: extraction.into_analysis(),
        status,
        sources: extract_sources(&reply.citations),
        raw_text: reply.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{"trustScore": 12, "verdict": "Misleading", "summary": "s", "manipulationTechniques": [], "positiveIndicators": [], "negativeIndicators": ["no sources"], "educationalInsight": "e"}"#;

    #[test]
    fn test_tagged_fence_wins() {
        let text = format!("```\nnot it\n```\n```json\n{}\n```", REPORT);
        let (source, block) = locate_block(&text);
        assert_eq!(source, BlockSource::TaggedFence);
        assert_eq!(block, REPORT);
    }

    #[test]
    fn test_untagged_fence() {
        let text = format!("Here you go:\n```\n{}\n```", REPORT);
        let (source, block) = locate_block(&text);
        assert_eq!(source, BlockSource::AnyFence);
        assert_eq!(block, REPORT);
    }

    #[test]
    fn test_other_tag_is_stripped() {
        let text = format!("```javascript\n{}\n```", REPORT);
        let (source, block) = locate_block(&text);
        assert_eq!(source, BlockSource::AnyFence);
        assert_eq!(block, REPORT);
        assert!(matches!(extract_analysis(&text), Extraction::Parsed(_)));
    }

    #[test]
    fn test_json_variant_tags_fall_through_to_any_fence() {
        for tag in ["json5", "jsonc", "JSON"] {
            let text = format!("```{}\n{}\n```", tag, REPORT);
            let (source, block) = locate_block(&text);
            assert_eq!(source, BlockSource::AnyFence, "tag {}", tag);
            assert_eq!(block, REPORT);
            assert!(matches!(extract_analysis(&text), Extraction::Parsed(_)));
        }
    }

    #[test]
    fn test_whole_text() {
        let (source, block) = locate_block(REPORT);
        assert_eq!(source, BlockSource::WholeText);
        assert_eq!(block, REPORT);

        let padded = format!("\n  {}  \n", REPORT);
        assert!(matches!(extract_analysis(&padded), Extraction::Parsed(_)));
    }

    #[test]
    fn test_unclosed_fence_falls_through_to_whole_text() {
        let text = format!("```json\n{}", REPORT);
        assert_eq!(locate_block(&text).0, BlockSource::WholeText);
        assert_eq!(extract_analysis(&text), Extraction::Unavailable);
    }

    #[test]
    fn test_valid_json_with_wrong_shape_degrades() {
        let text = "```json\n{\"verdict\": \"Credible\"}\n```";
        assert!(matches!(
            extract_analysis(text),
            Extraction::Degraded { .. }
        ));
    }

    #[test]
    fn test_extraction_into_analysis() {
        assert_eq!(Extraction::Unavailable.into_analysis(), None);
        assert_eq!(
            Extraction::Degraded {
                error: "x".into()
            }
            .into_analysis(),
            Some(AnalysisResult::fallback())
        );
    }

    #[test]
    fn test_sources_drop_missing_fields() {
        let citations = vec![
            RawCitation::new("A", "http://x"),
            RawCitation {
                title: None,
                uri: Some("http://z".into()),
            },
            RawCitation::default(),
        ];
        let sources = extract_sources(&citations);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "A");
    }
}
