use super::client::OpenAiHttpClient;
use super::types::{ImageGenerationRequest, ImageGenerationResponse};
use crate::ai::ImageGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiImageClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiImageClient {
    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(60), client),
            model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .client
            .get(url)
            .timeout(self.http.timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!("Error downloading image from {}: {}", url, e);
                Error::Generation(format!("Failed to download image: {}", e))
            })?;

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!("Error reading image body from {}: {}", url, e);
            Error::Generation(format!("Failed to read image body: {}", e))
        })?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageGenerationService for OpenAiImageClient {
    async fn generate(&self, prompt: &str, seed: u32) -> Result<Vec<u8>> {
        tracing::debug!("Requesting image for seed {} ({} chars)", seed, prompt.len());

        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
        };

        let response: ImageGenerationResponse =
            self.http.post("/v1/images/generations", &request).await?;

        let image_data = response
            .data
            .first()
            .ok_or_else(|| Error::Generation("No image data in OpenAI response".to_string()))?;

        let image_bytes = if let Some(b64_json) = &image_data.b64_json {
            use base64::Engine as _;
            base64::engine::general_purpose::STANDARD
                .decode(b64_json)
                .map_err(|e| Error::Generation(format!("Failed to decode base64 image: {}", e)))?
        } else if let Some(url) = &image_data.url {
            self.download_image(url).await?
        } else {
            return Err(Error::Generation(
                "No image data (neither base64 nor URL) in response".to_string(),
            ));
        };

        if image_bytes.is_empty() {
            return Err(Error::Generation("Provider returned an empty image".to_string()));
        }

        Ok(image_bytes)
    }
}
