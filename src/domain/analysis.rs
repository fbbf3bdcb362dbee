//! Structured credibility report and the envelope returned to callers.
//!
//! Field names serialize in camelCase so a report round-trips through the
//! exact JSON shape the model is asked to produce.

use serde::{Deserialize, Deserializer, Serialize};

/// Trust score used by the fallback report
pub const FALLBACK_TRUST_SCORE: u8 = 50;

/// Summary used by the fallback report
pub const FALLBACK_SUMMARY: &str = "The AI analyzed the content but failed to generate a structured report. Please check the raw sources below.";

/// Educational note used by the fallback report
pub const FALLBACK_INSIGHT: &str =
    "Sometimes AI outputs can be malformed. Always verify with primary sources.";

/// Overall judgement on the submitted content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Verdict {
    Credible,
    Questionable,
    Misleading,
    Satire,
    Unverifiable,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Credible => "Credible",
            Verdict::Questionable => "Questionable",
            Verdict::Misleading => "Misleading",
            Verdict::Satire => "Satire",
            Verdict::Unverifiable => "Unverifiable",
        }
    }
}

/// Unknown verdict strings collapse to `Unverifiable` instead of failing
/// the whole report.
impl From<String> for Verdict {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "credible" => Verdict::Credible,
            "questionable" => Verdict::Questionable,
            "misleading" => Verdict::Misleading,
            "satire" => Verdict::Satire,
            _ => Verdict::Unverifiable,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged rhetorical or manipulation pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedTechnique {
    /// Name of the fallacy or technique
    pub name: String,

    /// Short definition
    pub description: String,

    /// Quote (or description of a visual element) demonstrating it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_in_text: Option<String>,
}

/// The structured credibility report produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 = fabricated or scam, 100 = highly credible
    #[serde(deserialize_with = "deserialize_trust_score")]
    pub trust_score: u8,

    pub verdict: Verdict,

    /// Two or three sentence overview of the score
    pub summary: String,

    /// In the order the model reported them
    #[serde(default)]
    pub manipulation_techniques: Vec<DetectedTechnique>,

    #[serde(default)]
    pub positive_indicators: Vec<String>,

    #[serde(default)]
    pub negative_indicators: Vec<String>,

    /// Media literacy note tied to this analysis
    pub educational_insight: String,
}

impl AnalysisResult {
    /// Placeholder report used when the model returned a structured block
    /// that could not be decoded.
    pub fn fallback() -> Self {
        Self {
            trust_score: FALLBACK_TRUST_SCORE,
            verdict: Verdict::Unverifiable,
            summary: FALLBACK_SUMMARY.to_string(),
            manipulation_techniques: Vec::new(),
            positive_indicators: Vec::new(),
            negative_indicators: Vec::new(),
            educational_insight: FALLBACK_INSIGHT.to_string(),
        }
    }

    pub fn band(&self) -> CredibilityBand {
        CredibilityBand::from_score(self.trust_score)
    }
}

/// Accepts any JSON number, rounds it and clamps it into 0..=100.
fn deserialize_trust_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

/// Coarse reading of a trust score for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredibilityBand {
    /// 80 and above
    High,
    /// 50 to 79
    Questionable,
    /// Below 50
    Low,
}

impl CredibilityBand {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            CredibilityBand::High
        } else if score >= 50 {
            CredibilityBand::Questionable
        } else {
            CredibilityBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredibilityBand::High => "High Credibility",
            CredibilityBand::Questionable => "Questionable",
            CredibilityBand::Low => "Low Credibility",
        }
    }
}

/// One cited external reference from search grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// How the structured report was obtained from the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// The reply carried a decodable report
    Parsed,
    /// A structured block was found but could not be decoded; the fallback
    /// report stands in
    Degraded,
    /// Nothing structured could be located
    Unavailable,
}

/// Everything the caller receives for one successful round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Absent when `status` is `Unavailable`
    pub analysis: Option<AnalysisResult>,

    pub status: ReportStatus,

    /// May be empty; empty means no citations
    pub sources: Vec<GroundingSource>,

    /// Reply text exactly as received
    pub raw_text: String,
}

impl AnalysisReport {
    /// Whether there is a verdict to present
    pub fn has_verdict(&self) -> bool {
        self.analysis.is_some()
    }
}
