use crate::{
    config::GeminiConfig,
    credential::Credential,
    error::AppError,
    image_utils::EncodedImage,
    models::gemini::{GenerateContentRequest, ModelReply},
    providers::{VisionProvider, ANALYSIS_PROMPT},
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Gemini `generateContent` client
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(client: Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Gemini API format: {base_url}/models/{model}:generateContent
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe_image(
        &self,
        credential: &Credential,
        image: &EncodedImage,
    ) -> Result<ModelReply, AppError> {
        let request =
            GenerateContentRequest::with_image(ANALYSIS_PROMPT, &image.mime_type, image.data.clone());

        tracing::debug!(
            model = %self.config.model,
            key = %credential,
            mime_type = %image.mime_type,
            payload_bytes = image.data.len(),
            "Calling Gemini generateContent"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .query(&[("key", credential.expose())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::HttpRequest(e.without_url()))?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Upstream {
                status,
                message: error_text,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpRequest(e.without_url()))?;

        Ok(ModelReply::from_body(&body))
    }
}
