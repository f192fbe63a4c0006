pub mod chat_handlers;
pub mod job_handlers;
pub mod system_handlers;
pub mod user_handlers;

pub use chat_handlers::*;
pub use job_handlers::*;
pub use system_handlers::*;
pub use user_handlers::*;

use crate::core::{Database, User, UserRepository};
use crate::utils::{normalize_email, validate_email};
use crate::web::types::ApiError;
use tracing::error;

/// Look up the user behind a request email: 400 when malformed, 404 when
/// unknown
pub(crate) async fn require_user(db: &Database, email: &str) -> Result<User, ApiError> {
    validate_email(email).map_err(|e| ApiError::bad_request(e.to_string()))?;

    match UserRepository::new(db.pool())
        .find_by_email(&normalize_email(email))
        .await
    {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ApiError::user_not_found()),
        Err(e) => {
            error!("User lookup failed for {}: {}", email, e);
            Err(ApiError::internal("Failed to load user"))
        }
    }
}
