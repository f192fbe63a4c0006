// src/types/api.rs
//! Request and response bodies of the `/api` endpoints

use serde::{Deserialize, Serialize};

use super::jobs::{JobCard, SavedJob};

// ===== Generic =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ===== Onboarding =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingConfirmation {
    pub message: String,
    /// Set when a new user was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Set when an existing user was updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ===== Saved / applied jobs =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobBookmarkRequest {
    pub email: String,
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub job_link: String,
}

impl JobBookmarkRequest {
    pub fn new(email: &str, job: &SavedJob) -> Self {
        Self {
            email: email.to_string(),
            job_id: job.job_id.clone(),
            job_title: job.job_title.clone(),
            company_name: job.company_name.clone(),
            job_link: job.job_link.clone(),
        }
    }

    pub fn job(&self) -> SavedJob {
        SavedJob {
            job_id: self.job_id.clone(),
            job_title: self.job_title.clone(),
            company_name: self.company_name.clone(),
            job_link: self.job_link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedJobsResponse {
    pub saved_jobs: Vec<SavedJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedJobsResponse {
    pub applied_jobs: Vec<SavedJob>,
}

// ===== Chats =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub chat_name: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub chats: Vec<ChatSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChatRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChatResponse {
    pub chat_id: String,
    pub chat_name: String,
    pub initial_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub email: String,
    pub chat_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_job_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub message: String,
    #[serde(default)]
    pub jobs: Option<Vec<JobCard>>,
    #[serde(default)]
    pub selected_job_details: Option<JobCard>,
    /// Current chat name, which changes after the first user message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Sender::User),
            "bot" => Some(Sender::Bot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageView {
    pub sender: Sender,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<JobCard>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscript {
    pub chat_id: String,
    pub chat_name: String,
    pub messages: Vec<ChatMessageView>,
}
