/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - 全ての失敗を同じ envelope で返す: {"error": {"code": ..., "message": ...}}
 * - RepoError / PasswordError / UploadError を From で変換 (TokenError は middleware 側で INVALID_TOKEN に)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::password::PasswordError;
use crate::services::uploads::UploadError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("user not found")]
    UnknownSubject,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("access denied for this role")]
    RoleDenied,
    #[error("not the owner of this {resource}")]
    OwnershipDenied { resource: &'static str },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("{code}: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("file exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("request timed out")]
    Timeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::UnknownSubject
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::RoleDenied | AppError::OwnershipDenied { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::BadRequest { code, message } => (code, message),
            AppError::MissingToken => ("MISSING_TOKEN", "Unauthorized: no token provided".into()),
            AppError::InvalidToken => ("INVALID_TOKEN", "Unauthorized: token invalid".into()),
            AppError::UnknownSubject => ("UNKNOWN_SUBJECT", "Unauthorized: user not found".into()),
            AppError::InvalidCredentials => ("INVALID_CREDENTIALS", "Invalid credentials".into()),
            AppError::RoleDenied => ("ROLE_DENIED", "Forbidden: access denied".into()),
            AppError::OwnershipDenied { resource } => (
                "OWNERSHIP_DENIED",
                format!("Not authorized to modify this {resource}."),
            ),
            AppError::NotFound { resource } => ("NOT_FOUND", format!("{resource} not found.")),
            AppError::Conflict { code, message } => (code, message),
            AppError::PayloadTooLarge { limit } => (
                "FILE_TOO_LARGE",
                format!("file exceeds the {limit} byte limit"),
            ),
            AppError::Timeout => ("REQUEST_TIMEOUT", "request timed out".into()),
            AppError::Internal => ("INTERNAL_SERVER_ERROR", "internal server error".into()),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        // Conflict は handler 側で EMAIL_TAKEN / ALREADY_APPLIED に変換済み
        tracing::error!(error = ?e, "repository failure");
        AppError::Internal
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        tracing::error!(error = %e, "password hashing failure");
        AppError::Internal
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::InvalidType => {
                AppError::bad_request("INVALID_FILE_TYPE", "Only PDF or Word files are allowed")
            }
            UploadError::TooLarge { limit } => AppError::PayloadTooLarge { limit },
            UploadError::Io(err) => {
                tracing::error!(error = %err, "upload storage failure");
                AppError::Internal
            }
        }
    }
}
