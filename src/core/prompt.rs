//! Prompt strategy selection and request composition.
//!
//! Building a request is pure: no network access, no credential lookup.
//! The analyzer checks the credential before calling in here.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::adapters::OutboundRequest;
use crate::config::ModelSettings;
use crate::domain::AnalysisRequest;

/// An `http://` or `https://` link followed by non-whitespace
pub const URL_PATTERN: &str = r"https?://\S+";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(URL_PATTERN).expect("valid regex"));

/// Hosts whose links point at video content the model cannot watch
const VIDEO_HOSTS: [&str; 5] = [
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "tiktok.com",
    "dailymotion.com",
];

/// Instruction sent with every request. Defines the reply schema.
pub const SYSTEM_INSTRUCTION: &str = r#"You are TruthLens, an expert media literacy and misinformation detection system.
Analyze the submitted content (text or images) for accuracy, bias, logical fallacies and emotional manipulation, and verify its claims with the search tool you have been given.

OUTPUT FORMAT:
Reply with a single JSON object inside a ```json fenced block, with exactly these fields:
```json
{
  "trustScore": number, // integer 0-100 (0 = fabricated or scam, 100 = highly credible)
  "verdict": "Credible" | "Questionable" | "Misleading" | "Satire" | "Unverifiable",
  "summary": "Two or three sentences explaining the score.",
  "manipulationTechniques": [
    { "name": "Fallacy or technique", "description": "Definition", "exampleInText": "Quote from the text, or the visual element, that shows it" }
  ],
  "positiveIndicators": ["Credibility markers found, e.g. cited sources, neutral tone"],
  "negativeIndicators": ["Red flags found, e.g. emotional language, doctored image, no sources"],
  "educationalInsight": "A short paragraph teaching one media literacy concept relevant to this content."
}
```

LINKS (ESPECIALLY VIDEO LINKS):
You cannot open a URL, browse a live site or watch a video. When the input contains a URL you MUST use search to find:
1. The title, description and key claims associated with that exact URL.
2. Fact-checks, news coverage or discussion of that specific content.
3. The credibility of the hosting domain or channel.
Never guess or invent what the page or video says. If search returns nothing specific, state "Specific content could not be verified via search" and assess the general credibility of the domain or channel instead."#;

/// Which prompt template a request uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptStrategy {
    /// Image with no accompanying text
    ImageOnly,
    /// Image plus user-supplied context
    ImageWithContext,
    /// Text containing at least one link
    UrlText,
    /// Anything else
    PlainText,
}

impl PromptStrategy {
    /// Pick the template for a submission.
    ///
    /// Priority: image with text, image alone, text with a URL, plain text.
    pub fn select(request: &AnalysisRequest) -> Self {
        match (request.has_image(), request.has_text()) {
            (true, true) => PromptStrategy::ImageWithContext,
            (true, false) => PromptStrategy::ImageOnly,
            (false, _) if contains_url(&request.text) => PromptStrategy::UrlText,
            (false, _) => PromptStrategy::PlainText,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStrategy::ImageOnly => "image-only",
            PromptStrategy::ImageWithContext => "image-with-context",
            PromptStrategy::UrlText => "url-text",
            PromptStrategy::PlainText => "plain-text",
        }
    }

    /// Render the user prompt. `text` is inserted untrimmed.
    pub fn render(&self, text: &str) -> String {
        match self {
            PromptStrategy::ImageWithContext => format!(
                "Analyze the credibility of this image. Context provided by the user: \"{}\". \
                 Check for visual manipulation, misleading headlines, or false claims in any text shown in the image.",
                text
            ),
            PromptStrategy::ImageOnly => "Analyze the credibility of this image. \
                 Identify any text it contains, signs of visual manipulation, or misleading context."
                .to_string(),
            PromptStrategy::UrlText => render_url_prompt(text),
            PromptStrategy::PlainText => {
                format!("Analyze the credibility of the following text:\n\n\"{}\"", text)
            }
        }
    }
}

impl std::fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the text contains an http(s) link
pub fn contains_url(text: &str) -> bool {
    URL_RE.is_match(text)
}

/// All http(s) links in the text, in order of appearance
pub fn find_urls(text: &str) -> Vec<&str> {
    URL_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Whether a link points at a known video-hosting site
pub fn is_video_url(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    let host = lowered
        .split("://")
        .nth(1)
        .unwrap_or("")
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("");

    VIDEO_HOSTS
        .iter()
        .any(|video_host| host == *video_host || host.ends_with(&format!(".{}", video_host)))
}

fn render_url_prompt(text: &str) -> String {
    let mut steps = vec![
        "Use search to identify the content, title and key claims associated with the URL(s) provided. \
         You cannot open the link directly."
            .to_string(),
    ];

    if find_urls(text).into_iter().any(is_video_url) {
        steps.push(
            "This is a video link: search for the video title plus \"fact check\" or \"summary\" \
             to learn what the video is about."
                .to_string(),
        );
    }

    steps.push("Verify the credibility of the claims found via search.".to_string());
    steps.push(
        "If search finds nothing specific about this exact link, say so explicitly, do not invent its content, \
         and analyze the credibility of the domain or channel instead."
            .to_string(),
    );

    let numbered: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect();

    format!(
        "The user provided the following input, which contains a URL: \"{}\".\n\nTASK:\n{}",
        text,
        numbered.join("\n")
    )
}

/// Composes [`OutboundRequest`]s from user submissions
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    settings: ModelSettings,
}

impl RequestBuilder {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    /// Select a strategy and build the request. No side effects.
    ///
    /// Every request carries the search tool.
    pub fn build(&self, request: &AnalysisRequest) -> OutboundRequest {
        let strategy = PromptStrategy::select(request);

        OutboundRequest {
            model: self.settings.model.clone(),
            strategy,
            prompt: strategy.render(&request.text),
            image: request.image.clone(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            search_grounding: true,
            temperature: self.settings.temperature,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(ModelSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImagePayload;

    fn png() -> Option<ImagePayload> {
        Some(ImagePayload::new("image/png", vec![1, 2, 3]))
    }

    #[test]
    fn test_strategy_priority() {
        assert_eq!(
            PromptStrategy::select(&AnalysisRequest::new("caption", png())),
            PromptStrategy::ImageWithContext
        );
        assert_eq!(
            PromptStrategy::select(&AnalysisRequest::new("   ", png())),
            PromptStrategy::ImageOnly
        );
        assert_eq!(
            PromptStrategy::select(&AnalysisRequest::text("see http://a.example/x")),
            PromptStrategy::UrlText
        );
        assert_eq!(
            PromptStrategy::select(&AnalysisRequest::text("vaccines cause magnetism")),
            PromptStrategy::PlainText
        );
    }

    #[test]
    fn test_url_detection() {
        assert!(contains_url("https://x"));
        assert!(contains_url("prefix http://example.com/path?q=1 suffix"));
        assert!(!contains_url("https:// with a space"));
        assert!(!contains_url("ftp://example.com"));
        assert!(!contains_url("example.com"));

        assert_eq!(
            find_urls("a https://one.example b http://two.example/x"),
            vec!["https://one.example", "http://two.example/x"]
        );
    }

    #[test]
    fn test_video_hosts() {
        assert!(is_video_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_video_url("https://youtu.be/abc"));
        assert!(is_video_url("HTTPS://M.YOUTUBE.COM/shorts/abc"));
        assert!(!is_video_url("https://notyoutube.com/watch"));
        assert!(!is_video_url("https://news.example.com/youtube.com"));
    }

    #[test]
    fn test_video_step_only_for_video_links() {
        let video = PromptStrategy::UrlText.render("https://youtu.be/abc");
        assert!(video.contains("\"fact check\""));

        let article = PromptStrategy::UrlText.render("https://news.example.com/story");
        assert!(!article.contains("\"fact check\""));
        assert!(article.contains("do not invent"));
    }

    #[test]
    fn test_text_is_passed_untrimmed() {
        let prompt = PromptStrategy::PlainText.render("  padded claim  ");
        assert!(prompt.contains("\"  padded claim  \""));
    }

    #[test]
    fn test_build_carries_settings() {
        let settings = ModelSettings {
            temperature: 0.3,
            ..Default::default()
        };
        let built = RequestBuilder::new(settings).build(&AnalysisRequest::new("", png()));

        assert_eq!(built.strategy, PromptStrategy::ImageOnly);
        assert_eq!(built.model, "gemini-3-pro-preview");
        assert_eq!(built.temperature, 0.3);
        assert!(built.search_grounding);
        assert_eq!(built.system_instruction, SYSTEM_INSTRUCTION);
        assert_eq!(built.image.unwrap().media_type, "image/png");
    }

    #[test]
    fn test_system_instruction_lists_schema_fields() {
        for field in [
            "trustScore",
            "verdict",
            "summary",
            "manipulationTechniques",
            "exampleInText",
            "positiveIndicators",
            "negativeIndicators",
            "educationalInsight",
        ] {
            assert!(SYSTEM_INSTRUCTION.contains(field), "missing {}", field);
        }
    }
}
