// src/chat/mod.rs
//! Chat assistant: prompt assembly, job search tool calls and the
//! persistence of each turn

pub mod context;
pub mod service;
pub mod tools;

pub use service::{ChatService, ChatSettings};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("User not found")]
    UserNotFound,
    #[error("Chat not found")]
    ChatNotFound,
    #[error("{0}")]
    InvalidRequest(String),
    /// The language model failed; nothing was stored
    #[error("Assistant unavailable: {0}")]
    Upstream(anyhow::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type ChatResult<T> = std::result::Result<T, ChatError>;
