// src/llm/gemini.rs
use super::types::{Content, GenerateContentRequest, GenerateContentResponse};
use super::LanguageModel;
use crate::core::config_manager::ServiceConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{error, info};

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .context("GEMINI_API_KEY environment variable not set")?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[rocket::async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Content> {
        info!(
            "Sending request to Gemini {} ({} contents)",
            self.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error {}: {}", status, error_text);
            anyhow::bail!("Gemini API returned error {}", status);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .context("Gemini returned no candidates")?;

        if let Some(reason) = &candidate.finish_reason {
            info!("Gemini finished: {}", reason);
        }

        candidate
            .content
            .context("Gemini candidate carried no content")
    }
}
