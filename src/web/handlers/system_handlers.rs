// src/web/handlers/system_handlers.rs
use crate::web::types::{ApiError, ApiResult, AppState, TextResponse};

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn health_handler(state: &State<AppState>) -> ApiResult<TextResponse> {
    if let Err(e) = state.db.health_check().await {
        error!("Health check failed: {}", e);
        return Err(ApiError::new(
            Status::ServiceUnavailable,
            "Database unavailable",
            "DATABASE_ERROR",
            &["Check the database file and its permissions"],
        ));
    }

    info!("Health check OK");
    Ok(Json(TextResponse::success("OK".to_string())))
}
