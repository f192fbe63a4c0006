// src/client/mod.rs
//! Typed HTTP client for the `/api` endpoints

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_log;
use crate::session::ChatBackend;
use crate::types::{
    AppliedJobsResponse, ChatHistoryResponse, ChatMessageRequest, ChatMessageResponse,
    ChatTranscript, CreateChatRequest, CreateChatResponse, JobBookmarkRequest, MessageResponse,
    OnboardingConfirmation, ProfileUpdate, SavedJob, SavedJobsResponse, UserProfile,
};

const API_PREFIX: &str = "/api";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq)]
pub enum ClientError {
    /// The server answered with its error envelope
    #[error("{message} ({code}, HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// Non-2xx response without a readable envelope
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl ClientError {
    pub fn status(&self) -> u16 {
        match self {
            ClientError::Api { status, .. } | ClientError::Http { status, .. } => *status,
        }
    }

    fn from_body(status: u16, body: String) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: String,
            #[serde(default)]
            error_code: String,
        }

        match serde_json::from_str::<Envelope>(&body) {
            Ok(envelope) => ClientError::Api {
                status,
                code: envelope.error_code,
                message: envelope.error,
            },
            Err(_) => ClientError::Http { status, body },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub success: bool,
    pub message: String,
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}{}", base_url.trim_end_matches('/'), API_PREFIX),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn read<R: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<R> {
        let status = response.status();
        if status.is_success() {
            response
                .json::<R>()
                .await
                .with_context(|| format!("Failed to parse JSON response from {}", url))
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(warn, "{} returned {}: {}", url, status, body);
            Err(ClientError::from_body(status.as_u16(), body).into())
        }
    }

    /// Generic POST request with JSON
    async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {}", url))?;
        Self::read(response, &url).await
    }

    /// POST without a body, parameters in the query string
    async fn post_query<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<R> {
        let url = self.url(endpoint);
        let response = self
            .client
            .post(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {}", url))?;
        Self::read(response, &url).await
    }

    /// Generic GET request
    async fn get<R: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<R> {
        let url = self.url(endpoint);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", url))?;
        Self::read(response, &url).await
    }

    pub async fn confirm_onboarding(&self, profile: &UserProfile) -> Result<OnboardingConfirmation> {
        self.post_json("/confirmOnboardingDetails", profile).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<MessageResponse> {
        self.post_json("/updateUserProfile", update).await
    }

    pub async fn create_chat(&self, email: &str) -> Result<CreateChatResponse> {
        let request = CreateChatRequest {
            email: email.to_string(),
        };
        self.post_json("/createChat", &request).await
    }

    pub async fn send_message(&self, request: &ChatMessageRequest) -> Result<ChatMessageResponse> {
        self.post_json("/sendMessage", request).await
    }

    pub async fn chat_history(&self, email: &str) -> Result<ChatHistoryResponse> {
        self.get("/chatHistoryRequest", &[("email", email)]).await
    }

    pub async fn chat_messages(&self, email: &str, chat_id: &str) -> Result<ChatTranscript> {
        self.get("/getChatMessages", &[("email", email), ("chat_id", chat_id)])
            .await
    }

    pub async fn delete_chat(&self, email: &str, chat_id: &str) -> Result<MessageResponse> {
        self.post_query("/deleteChatSession", &[("email", email), ("chat_id", chat_id)])
            .await
    }

    pub async fn saved_jobs(&self, email: &str) -> Result<Vec<SavedJob>> {
        let response: SavedJobsResponse = self.get("/getSavedJobs", &[("email", email)]).await?;
        Ok(response.saved_jobs)
    }

    pub async fn applied_jobs(&self, email: &str) -> Result<Vec<SavedJob>> {
        let response: AppliedJobsResponse =
            self.get("/getAppliedJobs", &[("email", email)]).await?;
        Ok(response.applied_jobs)
    }

    pub async fn save_job(&self, email: &str, job: &SavedJob) -> Result<MessageResponse> {
        self.post_json("/saveJob", &JobBookmarkRequest::new(email, job))
            .await
    }

    pub async fn unsave_job(&self, email: &str, job: &SavedJob) -> Result<MessageResponse> {
        self.post_json("/unsaveJob", &JobBookmarkRequest::new(email, job))
            .await
    }

    pub async fn apply_job(&self, email: &str, job: &SavedJob) -> Result<MessageResponse> {
        self.post_json("/applyJob", &JobBookmarkRequest::new(email, job))
            .await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health", &[]).await
    }
}

#[rocket::async_trait]
impl ChatBackend for ApiClient {
    async fn chat_history(&self, email: &str) -> Result<ChatHistoryResponse> {
        ApiClient::chat_history(self, email).await
    }

    async fn create_chat(&self, email: &str) -> Result<CreateChatResponse> {
        ApiClient::create_chat(self, email).await
    }

    async fn send_message(&self, request: &ChatMessageRequest) -> Result<ChatMessageResponse> {
        ApiClient::send_message(self, request).await
    }

    async fn chat_messages(&self, email: &str, chat_id: &str) -> Result<ChatTranscript> {
        ApiClient::chat_messages(self, email, chat_id).await
    }

    async fn delete_chat(&self, email: &str, chat_id: &str) -> Result<()> {
        ApiClient::delete_chat(self, email, chat_id).await.map(|_| ())
    }

    async fn saved_jobs(&self, email: &str) -> Result<Vec<SavedJob>> {
        ApiClient::saved_jobs(self, email).await
    }

    async fn applied_jobs(&self, email: &str) -> Result<Vec<SavedJob>> {
        ApiClient::applied_jobs(self, email).await
    }

    async fn save_job(&self, email: &str, job: &SavedJob) -> Result<()> {
        ApiClient::save_job(self, email, job).await.map(|_| ())
    }

    async fn unsave_job(&self, email: &str, job: &SavedJob) -> Result<()> {
        ApiClient::unsave_job(self, email, job).await.map(|_| ())
    }

    async fn apply_job(&self, email: &str, job: &SavedJob) -> Result<()> {
        ApiClient::apply_job(self, email, job).await.map(|_| ())
    }
}
