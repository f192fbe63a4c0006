// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::chat::{ChatService, ChatSettings};
use crate::core::{ConfigManager, Database};
use crate::jsearch::JSearchClient;
use crate::llm::GeminiClient;
use crate::types::{
    AppliedJobsResponse, ChatHistoryResponse, ChatMessageRequest, ChatMessageResponse,
    ChatTranscript, CreateChatRequest, CreateChatResponse, JobBookmarkRequest, MessageResponse,
    OnboardingConfirmation, ProfileUpdate, SavedJobsResponse, UserProfile,
};
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Onboarding and profile

#[post("/confirmOnboardingDetails", data = "<profile>")]
pub async fn confirm_onboarding_details(
    profile: Json<UserProfile>,
    state: &State<AppState>,
) -> ApiResult<OnboardingConfirmation> {
    handlers::confirm_onboarding_handler(profile, state).await
}

#[post("/updateUserProfile", data = "<update>")]
pub async fn update_user_profile(
    update: Json<ProfileUpdate>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    handlers::update_profile_handler(update, state).await
}

// Saved and applied jobs

#[get("/getSavedJobs?<email>")]
pub async fn get_saved_jobs(email: &str, state: &State<AppState>) -> ApiResult<SavedJobsResponse> {
    handlers::saved_jobs_handler(email, state).await
}

#[get("/getAppliedJobs?<email>")]
pub async fn get_applied_jobs(
    email: &str,
    state: &State<AppState>,
) -> ApiResult<AppliedJobsResponse> {
    handlers::applied_jobs_handler(email, state).await
}

#[post("/saveJob", data = "<request>")]
pub async fn save_job(
    request: Json<JobBookmarkRequest>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    handlers::save_job_handler(request, state).await
}

#[post("/unsaveJob", data = "<request>")]
pub async fn unsave_job(
    request: Json<JobBookmarkRequest>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    handlers::unsave_job_handler(request, state).await
}

#[post("/applyJob", data = "<request>")]
pub async fn apply_job(
    request: Json<JobBookmarkRequest>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    handlers::apply_job_handler(request, state).await
}

// Chats

#[get("/chatHistoryRequest?<email>")]
pub async fn chat_history_request(
    email: &str,
    state: &State<AppState>,
) -> ApiResult<ChatHistoryResponse> {
    handlers::chat_history_handler(email, state).await
}

#[post("/createChat", data = "<request>")]
pub async fn create_chat(
    request: Json<CreateChatRequest>,
    state: &State<AppState>,
) -> ApiResult<CreateChatResponse> {
    handlers::create_chat_handler(request, state).await
}

#[post("/sendMessage", data = "<request>")]
pub async fn send_message(
    request: Json<ChatMessageRequest>,
    state: &State<AppState>,
) -> ApiResult<ChatMessageResponse> {
    handlers::send_message_handler(request, state).await
}

#[get("/getChatMessages?<email>&<chat_id>")]
pub async fn get_chat_messages(
    email: &str,
    chat_id: &str,
    state: &State<AppState>,
) -> ApiResult<ChatTranscript> {
    handlers::chat_messages_handler(email, chat_id, state).await
}

#[post("/deleteChatSession?<email>&<chat_id>")]
pub async fn delete_chat_session(
    email: &str,
    chat_id: &str,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    handlers::delete_chat_handler(email, chat_id, state).await
}

#[get("/health")]
pub async fn health(state: &State<AppState>) -> ApiResult<TextResponse> {
    handlers::health_handler(state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the endpoint path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable_entity() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body or query parameters could not be parsed".to_string(),
        "VALIDATION_ERROR".to_string(),
        vec![
            "Check field names and types".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the server around already constructed state
pub fn build_rocket(state: AppState, config: &ConfigManager) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.environment.address.clone()))
        .merge(("port", config.environment.port));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable_entity, internal_error],
        )
        .mount(
            "/api",
            routes![
                confirm_onboarding_details,
                update_user_profile,
                get_saved_jobs,
                get_applied_jobs,
                save_job,
                unsave_job,
                apply_job,
                chat_history_request,
                create_chat,
                send_message,
                get_chat_messages,
                delete_chat_session,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let db = match Database::connect(&config.environment.database_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e);
        }
    };

    let model = match GeminiClient::new(&config.service) {
        Ok(model) => model,
        Err(e) => {
            error!("Failed to initialize Gemini client: {}", e);
            return Err(e);
        }
    };
    let jobs = JSearchClient::new(&config.service)?;

    let chat = ChatService::new(
        db.clone(),
        Arc::new(model),
        Arc::new(jobs),
        ChatSettings::from_config(&config.service),
    );

    info!("Starting job chat API server");
    info!("Database: {}", config.environment.database_path.display());
    info!(
        "Listening on {}:{}",
        config.environment.address, config.environment.port
    );

    if let Err(e) = build_rocket(AppState { db, chat }, &config).launch().await {
        error!("Server stopped with error: {}", e);
        anyhow::bail!("Server error: {}", e);
    }

    Ok(())
}
