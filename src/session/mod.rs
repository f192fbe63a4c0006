// src/session/mod.rs
//! Client-side state of the chat screen: the chat page, its job cards and
//! the job detail modal. Everything talks to the backend through
//! [`ChatBackend`].

pub mod chat_page;
pub mod job_board;
pub mod job_modal;

pub use chat_page::{ActiveChat, ChatEntry, ChatPage, EntryStatus};
pub use job_board::JobBoard;
pub use job_modal::JobDetailModal;

use anyhow::Result;
use thiserror::Error;

use crate::types::{
    ChatHistoryResponse, ChatMessageRequest, ChatMessageResponse, ChatTranscript,
    CreateChatResponse, SavedJob,
};

#[rocket::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat_history(&self, email: &str) -> Result<ChatHistoryResponse>;
    async fn create_chat(&self, email: &str) -> Result<CreateChatResponse>;
    async fn send_message(&self, request: &ChatMessageRequest) -> Result<ChatMessageResponse>;
    async fn chat_messages(&self, email: &str, chat_id: &str) -> Result<ChatTranscript>;
    async fn delete_chat(&self, email: &str, chat_id: &str) -> Result<()>;
    async fn saved_jobs(&self, email: &str) -> Result<Vec<SavedJob>>;
    async fn applied_jobs(&self, email: &str) -> Result<Vec<SavedJob>>;
    async fn save_job(&self, email: &str, job: &SavedJob) -> Result<()>;
    async fn unsave_job(&self, email: &str, job: &SavedJob) -> Result<()>;
    async fn apply_job(&self, email: &str, job: &SavedJob) -> Result<()>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Wait for the current reply before sending another message")]
    Busy,
    #[error("No chat is open")]
    NoActiveChat,
    #[error("Chat not found: {0}")]
    UnknownChat(String),
    #[error("You already applied to this job")]
    AlreadyApplied,
    #[error("No application is waiting for confirmation")]
    NoPendingApply,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;
