// src/web/handlers/job_handlers.rs
use super::require_user;
use crate::core::{JobList, JobListRepository};
use crate::types::{AppliedJobsResponse, JobBookmarkRequest, MessageResponse, SavedJobsResponse};
use crate::web::types::{ApiError, ApiResult, AppState};

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

async fn list_jobs(
    state: &AppState,
    email: &str,
    list: JobList,
) -> Result<Vec<crate::types::SavedJob>, ApiError> {
    let user = require_user(&state.db, email).await?;

    JobListRepository::new(state.db.pool())
        .list(user.id, list)
        .await
        .map_err(|e| {
            error!("Failed to load {} jobs for {}: {}", list.as_str(), email, e);
            ApiError::internal(format!("Failed to load {} jobs", list.as_str()))
        })
}

pub async fn saved_jobs_handler(email: &str, state: &State<AppState>) -> ApiResult<SavedJobsResponse> {
    info!("Get saved jobs request for {}", email);
    let saved_jobs = list_jobs(state, email, JobList::Saved).await?;
    Ok(Json(SavedJobsResponse { saved_jobs }))
}

pub async fn applied_jobs_handler(
    email: &str,
    state: &State<AppState>,
) -> ApiResult<AppliedJobsResponse> {
    info!("Get applied jobs request for {}", email);
    let applied_jobs = list_jobs(state, email, JobList::Applied).await?;
    Ok(Json(AppliedJobsResponse { applied_jobs }))
}

async fn add_job(
    state: &AppState,
    request: &JobBookmarkRequest,
    list: JobList,
) -> Result<bool, ApiError> {
    if request.job_id.trim().is_empty() {
        return Err(ApiError::bad_request("job_id is required"));
    }
    let user = require_user(&state.db, &request.email).await?;

    JobListRepository::new(state.db.pool())
        .add(user.id, list, &request.job())
        .await
        .map_err(|e| {
            error!("Failed to add job {} to {} list: {}", request.job_id, list.as_str(), e);
            ApiError::internal("Failed to update job list")
        })
}

pub async fn save_job_handler(
    request: Json<JobBookmarkRequest>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    info!("Save job request for {}, job_id: {}", request.email, request.job_id);
    add_job(state, &request, JobList::Saved).await?;
    Ok(Json(MessageResponse::new("Job saved successfully")))
}

pub async fn apply_job_handler(
    request: Json<JobBookmarkRequest>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    info!("Apply job request for {}, job_id: {}", request.email, request.job_id);
    add_job(state, &request, JobList::Applied).await?;
    Ok(Json(MessageResponse::new("Job applied successfully")))
}

pub async fn unsave_job_handler(
    request: Json<JobBookmarkRequest>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    info!("Unsave job request for {}, job_id: {}", request.email, request.job_id);
    let user = require_user(&state.db, &request.email).await?;

    match JobListRepository::new(state.db.pool())
        .remove(user.id, JobList::Saved, &request.job_id)
        .await
    {
        Ok(_) => Ok(Json(MessageResponse::new("Job unsaved successfully"))),
        Err(e) => {
            error!("Failed to unsave job {}: {}", request.job_id, e);
            Err(ApiError::internal("Failed to update job list"))
        }
    }
}
