// src/jsearch/client.rs
use super::params::SearchParams;
use super::types::{RawJob, SearchResponse};
use super::JobSearch;
use crate::app_log;
use crate::core::config_manager::ServiceConfig;
use anyhow::{Context, Result};
use reqwest::Client;

const SEARCH_ENDPOINT: &str = "/search";
const JOB_DETAILS_ENDPOINT: &str = "/job-details";

pub struct JSearchClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    host: String,
}

impl JSearchClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        if config.jsearch_api_key.is_none() {
            app_log!(warn, "RAPIDAPI_KEY not set, job search is disabled");
        }

        Ok(Self {
            client,
            api_key: config.jsearch_api_key.clone(),
            base_url: config.jsearch_base_url.trim_end_matches('/').to_string(),
            host: config.jsearch_host.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("API key not configured"))
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<SearchResponse> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .header("x-rapidapi-key", api_key)
            .header("x-rapidapi-host", &self.host)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to call JSearch {}", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            app_log!(error, "JSearch {} failed: {} - {}", endpoint, status, error_text);
            anyhow::bail!("API error: {} - {}", status, error_text);
        }

        response
            .json::<SearchResponse>()
            .await
            .with_context(|| format!("Failed to parse JSearch {} response", endpoint))
    }
}

#[rocket::async_trait]
impl JobSearch for JSearchClient {
    async fn search_jobs(&self, params: &SearchParams) -> Result<SearchResponse> {
        params.validate()?;

        let response = self.get(SEARCH_ENDPOINT, &params.to_query()).await?;
        app_log!(
            info,
            "Job search successful: found {} jobs for '{}'",
            response.data.len(),
            params.query
        );
        Ok(response)
    }

    async fn job_details(&self, job_id: &str, country: &str) -> Result<Option<RawJob>> {
        let query = [
            ("job_id", job_id.to_string()),
            ("country", country.to_string()),
        ];

        let response = self.get(JOB_DETAILS_ENDPOINT, &query).await?;
        app_log!(info, "Job details fetch successful for job_id: {}", job_id);
        Ok(response.data.into_iter().next())
    }
}
