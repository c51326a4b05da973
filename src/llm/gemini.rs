//! Gemini INSPECT call: one non-streaming `generateContent` round trip.
//!
//! Differences from a plain chat call:
//! - API key sent in the `x-goog-api-key` header
//! - `responseMimeType` + `responseSchema` constrain output to the verdict shape
//! - Image travels as `inlineData` next to the instruction text
//!
//! Every transport or parse failure is reported as `AnalysisFailed`;
//! callers never see `reqwest` errors.

use super::prompts;
use super::provider::{Classify, InferenceConfig};
use super::response;
use super::types::Verdict;
use crate::capture::EncodedImage;
use crate::error::InspectError;

/// Client for the Gemini inference endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: InferenceConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Classify one image. Exactly one network attempt, no retries.
    pub async fn classify_image(&self, image: &EncodedImage) -> Result<Verdict, InspectError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            log::warn!("[LLM] No GEMINI_API_KEY set — refusing to call Gemini");
            return Err(InspectError::missing_api_key());
        };

        if image.data.is_empty() {
            return Err(InspectError::InputRead("image payload is empty".to_string()));
        }

        log::info!("[LLM] Provider: gemini ({:?} key)", self.config.credential_source);
        log::info!("[LLM] Model: {}", self.config.model);
        log::info!(
            "[LLM] Image: {} ({} bytes)",
            image.media_type,
            image.byte_len
        );

        let start = std::time::Instant::now();

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&prompts::build_request(image))
            .send()
            .await
            .map_err(|e| {
                log::error!("[LLM] HTTP request failed: {}", e);
                InspectError::AnalysisFailed(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            log::error!("[LLM] Failed to read response body: {}", e);
            InspectError::AnalysisFailed(e.to_string())
        })?;

        log::info!("[LLM] API latency: {}ms", start.elapsed().as_millis());

        if !status.is_success() {
            log::error!("[LLM] Gemini API returned {}: {}", status, body);
            return Err(InspectError::AnalysisFailed(format!(
                "Gemini API returned {}: {}",
                status,
                response::excerpt(body.trim(), 300)
            )));
        }

        if body.trim().is_empty() {
            log::error!("[LLM] Gemini returned an empty body");
            return Err(InspectError::EmptyResponse);
        }

        let envelope: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            log::error!("[LLM] Response envelope is not JSON: {}", e);
            InspectError::AnalysisFailed(format!("invalid response envelope: {}", e))
        })?;

        response::log_usage(&envelope);

        let text = response::extract_text(&envelope).ok_or_else(|| {
            log::error!(
                "[LLM] No text in response: {}",
                response::excerpt(&body, 300)
            );
            InspectError::EmptyResponse
        })?;

        let verdict = response::parse_verdict(&text)?;
        log::info!(
            "[LLM] Verdict: {} ({})",
            verdict.status().name(),
            verdict.object_type()
        );
        Ok(verdict)
    }
}

impl Classify for GeminiClient {
    async fn classify(&self, image: &EncodedImage) -> Result<Verdict, InspectError> {
        self.classify_image(image).await
    }
}
