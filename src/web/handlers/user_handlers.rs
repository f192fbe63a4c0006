// src/web/handlers/user_handlers.rs
use crate::core::{UpsertOutcome, UserRepository};
use crate::types::{MessageResponse, OnboardingConfirmation, ProfileUpdate, UserProfile};
use crate::utils::{normalize_email, validate_email};
use crate::web::types::{ApiError, ApiResult, AppState};

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

pub async fn confirm_onboarding_handler(
    profile: Json<UserProfile>,
    state: &State<AppState>,
) -> ApiResult<OnboardingConfirmation> {
    let mut profile = profile.into_inner();
    validate_email(&profile.email).map_err(|e| ApiError::bad_request(e.to_string()))?;
    profile.email = normalize_email(&profile.email);

    info!("Confirm onboarding details for {}", profile.email);

    match UserRepository::new(state.db.pool()).upsert(&profile).await {
        Ok(UpsertOutcome::Created(id)) => Ok(Json(OnboardingConfirmation {
            message: "User onboarded successfully".to_string(),
            id: Some(id.to_string()),
            email: None,
        })),
        Ok(UpsertOutcome::Updated) => Ok(Json(OnboardingConfirmation {
            message: "User details updated successfully".to_string(),
            id: None,
            email: Some(profile.email),
        })),
        Err(e) => {
            error!("Failed to store profile for {}: {}", profile.email, e);
            Err(ApiError::internal("Failed to save user details"))
        }
    }
}

pub async fn update_profile_handler(
    update: Json<ProfileUpdate>,
    state: &State<AppState>,
) -> ApiResult<MessageResponse> {
    let mut update = update.into_inner();
    validate_email(&update.email).map_err(|e| ApiError::bad_request(e.to_string()))?;
    update.email = normalize_email(&update.email);

    info!("Update user profile request for {}", update.email);

    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    match UserRepository::new(state.db.pool()).update(&update).await {
        Ok(true) => Ok(Json(MessageResponse::new("User profile updated successfully"))),
        Ok(false) => Err(ApiError::user_not_found()),
        Err(e) => {
            error!("Failed to update profile for {}: {}", update.email, e);
            Err(ApiError::internal("Failed to update user profile"))
        }
    }
}
