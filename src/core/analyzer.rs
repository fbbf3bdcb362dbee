//! Entry point for credibility analysis.
//!
//! One call = one credential check, one request, one transport round trip,
//! one parse. No retries, no caching, no state kept between calls.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{GeminiTransport, ModelTransport};
use crate::config::{ApiKey, ModelSettings, ResolvedConfig, API_KEY_ENV_VARS};
use crate::domain::{AnalysisReport, AnalysisRequest, ImagePayload, ReportStatus};
use crate::error::AnalysisError;

use super::parser;
use super::prompt::RequestBuilder;

/// Runs analyses against a model transport
pub struct Analyzer<T: ModelTransport> {
    builder: RequestBuilder,
    api_key: Option<ApiKey>,
    transport: T,
}

impl Analyzer<GeminiTransport> {
    /// Gemini-backed analyzer from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.model.clone(),
            config.api_key.clone(),
            GeminiTransport::from_settings(&config.model),
        )
    }
}

impl<T: ModelTransport> Analyzer<T> {
    pub fn new(settings: ModelSettings, api_key: Option<ApiKey>, transport: T) -> Self {
        Self {
            builder: RequestBuilder::new(settings),
            api_key,
            transport,
        }
    }

    /// Analyze text and/or an image.
    ///
    /// Fails with [`AnalysisError::Configuration`] before anything is built
    /// or sent when no API key is configured. User content is sent to the
    /// remote model service.
    #[instrument(skip_all, fields(request_id = %Uuid::new_v4(), transport = self.transport.name()))]
    pub async fn analyze(
        &self,
        text: &str,
        image: Option<ImagePayload>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let api_key = self.api_key.as_ref().ok_or(AnalysisError::Configuration {
            env_var: API_KEY_ENV_VARS[0],
        })?;

        self.run(&AnalysisRequest::new(text, image), api_key).await
    }

    /// Same as [`Analyzer::analyze`], with the image given as media type
    /// plus base64 data.
    pub async fn analyze_base64(
        &self,
        text: &str,
        image: Option<(&str, &str)>,
    ) -> Result<AnalysisReport, AnalysisError> {
        if self.api_key.is_none() {
            return Err(AnalysisError::Configuration {
                env_var: API_KEY_ENV_VARS[0],
            });
        }

        let image = image
            .map(|(media_type, data)| ImagePayload::from_base64(media_type, data))
            .transpose()?;

        self.analyze(text, image).await
    }

    /// Analyze a prepared request
    pub async fn analyze_request(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(&request.text, request.image.clone()).await
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        api_key: &ApiKey,
    ) -> Result<AnalysisReport, AnalysisError> {
        let outbound = self.builder.build(request);

        info!(
            strategy = %outbound.strategy,
            model = %outbound.model,
            text_chars = request.text.chars().count(),
            image_bytes = request.image.as_ref().map(ImagePayload::len).unwrap_or(0),
            "Sending content to remote model service"
        );

        let reply = self.transport.generate(&outbound, api_key).await?;
        let report = parser::parse(&reply);

        match report.status {
            ReportStatus::Parsed => info!(
                sources = report.sources.len(),
                "Structured report received"
            ),
            ReportStatus::Degraded => warn!("Report degraded to fallback"),
            ReportStatus::Unavailable => warn!(
                reply_chars = report.raw_text.chars().count(),
                "No structured report in reply"
            ),
        }

        Ok(report)
    }
}
