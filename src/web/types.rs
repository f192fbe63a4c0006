// src/web/types.rs
//! Response envelopes and the error responder shared by all handlers

use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};

use crate::app_log;
use crate::chat::{ChatError, ChatService};
use crate::core::Database;

/// Managed state of the server
pub struct AppState {
    pub db: Database,
    pub chat: ChatService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
}

impl TextResponse {
    pub fn success(message: String) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}

/// Error envelope with the HTTP status it is sent with
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub body: StandardErrorResponse,
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    pub fn new(status: Status, error: impl Into<String>, code: &str, suggestions: &[&str]) -> Self {
        Self {
            status,
            body: StandardErrorResponse::new(
                error.into(),
                code.to_string(),
                suggestions.iter().map(|s| s.to_string()).collect(),
            ),
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(
            Status::BadRequest,
            error,
            "BAD_REQUEST",
            &["Check the request parameters", "Verify all required fields are present"],
        )
    }

    pub fn user_not_found() -> Self {
        Self::new(
            Status::NotFound,
            "User not found",
            "USER_NOT_FOUND",
            &["Complete onboarding first", "Check the email address"],
        )
    }

    pub fn chat_not_found() -> Self {
        Self::new(
            Status::NotFound,
            "Chat not found",
            "CHAT_NOT_FOUND",
            &["Refresh the chat list", "Start a new chat"],
        )
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(
            Status::InternalServerError,
            error,
            "INTERNAL_ERROR",
            &["Try again in a few moments", "Contact support if the problem persists"],
        )
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::UserNotFound => ApiError::user_not_found(),
            ChatError::ChatNotFound => ApiError::chat_not_found(),
            ChatError::InvalidRequest(message) => ApiError::bad_request(message),
            ChatError::Upstream(e) => {
                app_log!(error, "Assistant call failed: {:#}", e);
                ApiError::new(
                    Status::BadGateway,
                    "The assistant is unavailable",
                    "ASSISTANT_UNAVAILABLE",
                    &["Try again in a few moments", "Your message was not saved"],
                )
            }
            ChatError::Storage(e) => {
                app_log!(error, "Chat storage failed: {:#}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(Json(self.body).respond_to(request)?)
            .status(self.status)
            .ok()
    }
}
