/*
 * Responsibility
 * - POST /auth/register, POST /auth/login
 * - password は bcrypt (spawn_blocking)、token は TokenService で発行
 * - login 失敗は email 不明 / password 不一致を区別しない
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::auth::{AuthResponse, LoginRequest, RegisterRequest, normalize_email},
        extractors::JsonBody,
    },
    error::AppError,
    repos::{
        error::RepoError,
        user_repo::{NewUser, UserProfile},
    },
    state::AppState,
};

fn issue_token(state: &AppState, user: &UserProfile) -> Result<String, AppError> {
    state.tokens.issue(user.id, user.role).map_err(|e| {
        tracing::error!(error = %e, user_id = %user.id, "token signing failed");
        AppError::Internal
    })
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let role = req.validate()?;
    let email = normalize_email(&req.email);
    let password_hash = state.passwords.hash(&req.password).await?;

    let user = state
        .users
        .create(NewUser {
            name: req.name.trim(),
            email: &email,
            password_hash: &password_hash,
            role,
        })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("EMAIL_TAKEN", "Email already registered"),
            other => other.into(),
        })?;

    let token = issue_token(&state, &user)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;

    let Some(credentials) = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
    else {
        return Err(AppError::InvalidCredentials);
    };

    if !state
        .passwords
        .verify(&req.password, &credentials.password_hash)
        .await?
    {
        tracing::info!(user_id = %credentials.profile.id, "login with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let user = credentials.profile;
    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}
