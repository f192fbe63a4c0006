// src/llm/mod.rs
//! Gemini chat model client

pub mod gemini;
pub mod types;

pub use gemini::GeminiClient;
pub use types::{
    Content, FunctionCall, FunctionDeclaration, GenerateContentRequest, GenerationConfig, Part,
    Tool,
};

use anyhow::Result;

#[rocket::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Content of the first candidate
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Content>;
}
