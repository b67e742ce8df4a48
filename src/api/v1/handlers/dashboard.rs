/*
 * Responsibility
 * - GET /protected/dashboard (employer only)
 */
use axum::Json;

use crate::api::v1::{dto::MessageResponse, extractors::CurrentIdentity};

pub async fn dashboard(CurrentIdentity(identity): CurrentIdentity) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!(
        "Welcome, {} {}",
        identity.role, identity.user_id
    )))
}
