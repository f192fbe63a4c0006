// src/web/handlers/chat_handlers.rs
use crate::types::{
    ChatHistoryResponse, ChatMessageRequest, ChatMessageResponse, ChatTranscript,
    CreateChatRequest, CreateChatResponse, MessageResponse,
};
use crate::web::types::{ApiError, ApiResult, AppState};

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

/// Log server-side failures before they become responses
fn log_failure(context: &str, error: ApiError) -> ApiError {
    if error.status.code >= 500 {
        error!("{} failed: {}", context, error.body.error);
    }
    error
}

pub async fn chat_history_handler(
    email: &str,
    state: &State<AppState>,
) -> ApiResult<ChatHistoryResponse> {
    info!("Chat history request for {}", email);
    state
        .chat
        .chat_history(email)
        .await
        .map(Json)
        .map_err(|e| log_failure("Chat history", e.into()))
}

pub async fn create_chat_handler(
    request: Json<CreateChatRequest>,
    state: &State<AppState>,
) -> ApiResult<CreateChatResponse> {
    info!("Create chat request for {}", request.email);
    state
        .chat
        .create_new_chat(&request.email)
        .await
        .map(Json)
        .map_err(|e| log_failure("Create chat", e.into()))
}

pub async fn send_message_handler(
    request: Json<ChatMessageRequest>,
    state: &State<AppState>,
) -> ApiResult<ChatMessageResponse> {
    info!(
        "Send message request for {}, chat_id: {}",
        request.email, request.chat_id
    );
    state
        .chat
        .process_chat_message(&request)
        .await
        .map(Json)
        .map_err(|e| log_failure("Send message", e.into()))
}

pub async fn chat_messages_handler(
    email: &str,
    chat_id: &str,
    state: &State<AppState>,
) -> ApiResult<ChatTranscript> {
    info!("Get chat messages request for {}, chat_id: {}", email, chat_id);
    state
        .chat
        .get_chat_messages(email, chat_id)
        .await
        .map(Json)
        .map_err(|e| log_failure("Get chat messages", e.into()))
}

pub async fn delete_chat_handler(
    email: &str,
    chat_id: &str,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    info!("Delete chat session request for {}, chat_id: {}", email, chat_id);
    state
        .chat
        .delete_chat(email, chat_id)
        .await
        .map(|_| Json(MessageResponse::new("Chat session deleted successfully")))
        .map_err(|e| log_failure("Delete chat", e.into()))
}
