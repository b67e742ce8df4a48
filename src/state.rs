/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - repos (trait object), token / password / upload services
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::{application_repo::ApplicationRepo, job_repo::JobRepo, user_repo::UserRepo};
use crate::services::auth::{PasswordHasher, TokenService};
use crate::services::uploads::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub jobs: Arc<dyn JobRepo>,
    pub applications: Arc<dyn ApplicationRepo>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
    pub uploads: Arc<UploadStore>,
}
