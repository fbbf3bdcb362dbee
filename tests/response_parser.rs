//! Response Parser Integration Tests
//!
//! Tests for report extraction, fallback behavior, and source filtering.

use serde_json::{json, Value};
use truthlens::core::parser::{extract_sources, parse};
use truthlens::domain::analysis::{FALLBACK_INSIGHT, FALLBACK_SUMMARY};
use truthlens::{AnalysisResult, ModelReply, RawCitation, ReportStatus, Verdict};

fn full_report() -> Value {
    json!({
        "trustScore": 31,
        "verdict": "Questionable",
        "summary": "The headline overstates the study.",
        "manipulationTechniques": [
            {
                "name": "Hasty Generalization",
                "description": "Drawing a broad conclusion from a small sample",
                "exampleInText": "one trial proves it works for everyone"
            },
            {
                "name": "Loaded Language",
                "description": "Emotionally charged wording"
            }
        ],
        "positiveIndicators": ["Links to the original paper"],
        "negativeIndicators": ["Sensational headline", "No expert quotes"],
        "educationalInsight": "Small studies rarely generalize."
    })
}

#[test]
fn test_tagged_block_round_trip() {
    let original = full_report();
    let text = format!(
        "Analysis complete.\n```json\n{}\n```\nLet me know if you need more.",
        serde_json::to_string_pretty(&original).unwrap()
    );

    let report = parse(&ModelReply::new(text.clone()));

    assert_eq!(report.status, ReportStatus::Parsed);
    assert_eq!(report.raw_text, text);

    let analysis = report.analysis.unwrap();
    assert_eq!(analysis.verdict, Verdict::Questionable);
    assert_eq!(analysis.manipulation_techniques.len(), 2);
    assert_eq!(analysis.manipulation_techniques[0].name, "Hasty Generalization");
    assert_eq!(analysis.manipulation_techniques[1].example_in_text, None);

    // Re-serializing reconstructs the same values
    assert_eq!(serde_json::to_value(&analysis).unwrap(), original);
}

#[test]
fn test_untagged_block() {
    let text = format!("```\n{}\n```", full_report());
    let report = parse(&ModelReply::new(text));
    assert_eq!(report.status, ReportStatus::Parsed);
    assert_eq!(report.analysis.unwrap().trust_score, 31);
}

#[test]
fn test_jsonc_tagged_block_parses() {
    let text = format!("```jsonc\n{}\n```", full_report());
    let report = parse(&ModelReply::new(text));
    assert_eq!(report.status, ReportStatus::Parsed);
    assert_eq!(report.analysis.unwrap().verdict, Verdict::Questionable);
}

#[test]
fn test_bare_json_reply() {
    let report = parse(&ModelReply::new(full_report().to_string()));
    assert_eq!(report.status, ReportStatus::Parsed);
}

#[test]
fn test_invalid_block_yields_exact_fallback() {
    let text = "Here:\n```json\n{\"trustScore\": 70, \"verdict\": \"Credible\",\n```\nsorry";
    let report = parse(&ModelReply::new(text));

    assert_eq!(report.status, ReportStatus::Degraded);
    assert_eq!(report.raw_text, text);

    let analysis = report.analysis.unwrap();
    assert_eq!(analysis, AnalysisResult::fallback());
    assert_eq!(analysis.trust_score, 50);
    assert_eq!(analysis.verdict, Verdict::Unverifiable);
    assert_eq!(analysis.summary, FALLBACK_SUMMARY);
    assert_eq!(analysis.educational_insight, FALLBACK_INSIGHT);
    assert!(analysis.manipulation_techniques.is_empty());
    assert!(analysis.positive_indicators.is_empty());
    assert!(analysis.negative_indicators.is_empty());
}

#[test]
fn test_prose_reply_is_unavailable_but_keeps_sources() {
    let text = "The article appears to be satire from a known parody site.";
    let reply = ModelReply::new(text).with_citations(vec![RawCitation::new(
        "Parody site profile",
        "https://mediabias.example/parody",
    )]);

    let report = parse(&reply);

    assert_eq!(report.status, ReportStatus::Unavailable);
    assert!(report.analysis.is_none());
    assert_eq!(report.raw_text, text);
    assert_eq!(report.sources.len(), 1);
}

#[test]
fn test_empty_reply() {
    let report = parse(&ModelReply::default());
    assert_eq!(report.status, ReportStatus::Unavailable);
    assert!(report.analysis.is_none());
    assert!(report.sources.is_empty());
    assert_eq!(report.raw_text, "");
}

#[test]
fn test_parsing_is_idempotent() {
    let replies = [
        ModelReply::new(format!("```json\n{}\n```", full_report())),
        ModelReply::new("```json\nbroken\n```"),
        ModelReply::new("no structure here"),
    ];

    for reply in &replies {
        assert_eq!(parse(reply), parse(reply));
    }
}

#[test]
fn test_source_filtering() {
    let citations = vec![
        RawCitation::new("A", "http://x"),
        RawCitation::new("", "http://y"),
        RawCitation::new("B", ""),
    ];

    let sources = extract_sources(&citations);

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].title, "A");
    assert_eq!(sources[0].uri, "http://x");
}

#[test]
fn test_sources_independent_of_parse_outcome() {
    let citations = vec![
        RawCitation::new("One", "https://one.example"),
        RawCitation::new("Two", "https://two.example"),
    ];

    let bare = full_report().to_string();
    for text in ["```json\nbroken\n```", "prose", bare.as_str()] {
        let report = parse(&ModelReply::new(text).with_citations(citations.clone()));
        let titles: Vec<&str> = report.sources.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two"]);
    }
}

#[test]
fn test_report_serializes_for_callers() {
    let report = parse(&ModelReply::new("prose"));
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["analysis"], Value::Null);
    assert_eq!(value["status"], "unavailable");
    assert_eq!(value["rawText"], "prose");
    assert_eq!(value["sources"], json!([]));
}
