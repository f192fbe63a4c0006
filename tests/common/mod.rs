//! Stub model and job search shared by the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use job_chat::chat::{ChatService, ChatSettings};
use job_chat::core::config_manager::{EnvironmentConfig, ServiceConfig};
use job_chat::core::{ConfigManager, Database};
use job_chat::jsearch::{JobSearch, RawJob, SearchParams, SearchResponse};
use job_chat::llm::{Content, GenerateContentRequest, LanguageModel};
use job_chat::web::AppState;

/// Replies with the last message it was given
pub struct EchoModel {
    pub fail: bool,
}

#[rocket::async_trait]
impl LanguageModel for EchoModel {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Content> {
        if self.fail {
            anyhow::bail!("Gemini API returned error 503");
        }
        let last = request
            .contents
            .last()
            .map(|c| c.text())
            .unwrap_or_default();
        Ok(Content::model(format!("You said: {}", last)))
    }
}

pub struct NoJobs;

#[rocket::async_trait]
impl JobSearch for NoJobs {
    async fn search_jobs(&self, _params: &SearchParams) -> Result<SearchResponse> {
        Ok(SearchResponse::default())
    }

    async fn job_details(&self, _job_id: &str, _country: &str) -> Result<Option<RawJob>> {
        Ok(None)
    }
}

pub async fn app_state(fail_model: bool) -> AppState {
    let db = Database::in_memory().await.unwrap();
    let chat = ChatService::new(
        db.clone(),
        Arc::new(EchoModel { fail: fail_model }),
        Arc::new(NoJobs),
        ChatSettings::default(),
    );
    AppState { db, chat }
}

pub fn config() -> ConfigManager {
    ConfigManager {
        environment: EnvironmentConfig::default(),
        service: ServiceConfig::default(),
    }
}
