//! Plain-text rendering of an analysis report for the terminal.

use std::fmt;

use crate::domain::{AnalysisReport, ReportStatus};

/// Render a report as plain text
pub fn render(report: &AnalysisReport) -> String {
    ReportView(report).to_string()
}

/// Terminal layout of a report
struct ReportView<'a>(&'a AnalysisReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        let Some(analysis) = report.analysis.as_ref() else {
            // No structured verdict: show what the model said
            writeln!(f, "No structured verdict available.")?;
            writeln!(f)?;
            writeln!(f, "{}", report.raw_text.trim())?;
            return write_sources(f, report);
        };

        writeln!(
            f,
            "Trust score: {}/100 ({})",
            analysis.trust_score,
            analysis.band().label()
        )?;
        writeln!(f, "Verdict:     {}", analysis.verdict)?;
        if report.status == ReportStatus::Degraded {
            writeln!(f, "(the model's structured report was malformed)")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", analysis.summary)?;

        if !analysis.positive_indicators.is_empty() {
            writeln!(f, "\nPositive indicators:")?;
            for indicator in &analysis.positive_indicators {
                writeln!(f, "  + {}", indicator)?;
            }
        }

        if !analysis.negative_indicators.is_empty() {
            writeln!(f, "\nNegative indicators:")?;
            for indicator in &analysis.negative_indicators {
                writeln!(f, "  - {}", indicator)?;
            }
        }

        writeln!(f, "\nDetected manipulation:")?;
        if analysis.manipulation_techniques.is_empty() {
            writeln!(f, "  No significant logical fallacies detected.")?;
        }
        for technique in &analysis.manipulation_techniques {
            writeln!(f, "  * {}: {}", technique.name, technique.description)?;
            if let Some(example) = technique.example_in_text.as_deref() {
                writeln!(f, "      \"{}\"", example)?;
            }
        }

        writeln!(f, "\nMedia literacy insight:")?;
        writeln!(f, "  {}", analysis.educational_insight)?;

        write_sources(f, report)?;
        if report.status == ReportStatus::Degraded && !report.raw_text.trim().is_empty() {
            writeln!(f, "\nRaw model output:\n{}", report.raw_text.trim())?;
        }

        Ok(())
    }
}

fn write_sources(f: &mut fmt::Formatter<'_>, report: &AnalysisReport) -> fmt::Result {
    writeln!(f, "\nGrounding sources:")?;
    if report.sources.is_empty() {
        writeln!(f, "  (none cited)")?;
    }
    for source in &report.sources {
        writeln!(f, "  - {} <{}>", source.title, source.uri)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisResult, DetectedTechnique, GroundingSource, Verdict};

    #[test]
    fn test_render_full_report() {
        let report = AnalysisReport {
            analysis: Some(AnalysisResult {
                trust_score: 22,
                verdict: Verdict::Misleading,
                summary: "Cherry-picked statistics.".to_string(),
                manipulation_techniques: vec![DetectedTechnique {
                    name: "Appeal to Fear".to_string(),
                    description: "Uses fear to persuade".to_string(),
                    example_in_text: Some("Act now or lose everything".to_string()),
                }],
                positive_indicators: vec![],
                negative_indicators: vec!["No sources".to_string()],
                educational_insight: "Check the base rate.".to_string(),
            }),
            status: ReportStatus::Parsed,
            sources: vec![GroundingSource {
                title: "Fact check".to_string(),
                uri: "https://facts.example".to_string(),
            }],
            raw_text: String::new(),
        };

        let text = render(&report);
        assert!(text.contains("Trust score: 22/100 (Low Credibility)"));
        assert!(text.contains("Verdict:     Misleading"));
        assert!(text.contains("* Appeal to Fear: Uses fear to persuade"));
        assert!(text.contains("\"Act now or lose everything\""));
        assert!(text.contains("  - No sources"));
        assert!(text.contains("Fact check <https://facts.example>"));
        assert!(!text.contains("Positive indicators"));
    }

    #[test]
    fn test_render_degraded_report() {
        let report = AnalysisReport {
            analysis: Some(AnalysisResult::fallback()),
            status: ReportStatus::Degraded,
            sources: vec![],
            raw_text: "```json\n{ broken\n```".to_string(),
        };

        let text = render(&report);
        assert!(text.contains("Trust score: 50/100 (Questionable)"));
        assert!(text.contains("(the model's structured report was malformed)"));
        assert!(text.contains("No significant logical fallacies detected."));
        assert!(text.contains("Raw model output:\n```json\n{ broken\n```"));
    }

    #[test]
    fn test_render_without_verdict() {
        let report = AnalysisReport {
            analysis: None,
            status: ReportStatus::Unavailable,
            sources: vec![],
            raw_text: "I could not analyze this.".to_string(),
        };

        let text = render(&report);
        assert!(text.starts_with("No structured verdict available."));
        assert!(text.contains("I could not analyze this."));
        assert!(text.contains("(none cited)"));
    }
}
