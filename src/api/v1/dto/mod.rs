/*
 * Responsibility
 * - request/response DTO (JSON は camelCase)
 * - validate() で形式チェック → AppError::BadRequest
 */
pub mod applications;
pub mod auth;
pub mod jobs;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
