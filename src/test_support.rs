//! Shared fixtures for unit and router tests.
//!
//! Memory repos + real token / password / upload services. bcrypt cost is the
//! minimum (4) to keep tests fast.
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tempfile::TempDir;

use crate::app::build_router;
use crate::config::{AppEnv, Config};
use crate::repos::memory::{MemoryApplicationRepo, MemoryJobRepo, MemoryUserRepo};
use crate::repos::user_repo::{NewUser, UserProfile, UserRepo};
use crate::services::auth::{PasswordHasher, Role, TokenService};
use crate::services::uploads::UploadStore;
use crate::state::AppState;

pub const TEST_SECRET: &[u8] = b"test-secret";
pub const TEST_BCRYPT_COST: u32 = 4;
pub const TEST_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

pub fn config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        jwt_secret: String::from_utf8_lossy(TEST_SECRET).into_owned(),
        token_ttl_seconds: None,
        bcrypt_cost: TEST_BCRYPT_COST,
        upload_dir: PathBuf::from("unused"),
        max_upload_file_bytes: TEST_UPLOAD_LIMIT,
        max_request_body_bytes: 12 * 1024 * 1024,
        request_timeout: Duration::from_secs(10),
    }
}

pub struct TestApp {
    pub state: AppState,
    pub users: Arc<MemoryUserRepo>,
    pub jobs: Arc<MemoryJobRepo>,
    pub applications: Arc<MemoryApplicationRepo>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_upload_limit(TEST_UPLOAD_LIMIT)
    }

    pub fn with_upload_limit(max_file_bytes: usize) -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let users = Arc::new(MemoryUserRepo::default());
        let jobs = Arc::new(MemoryJobRepo::default());
        let applications = Arc::new(MemoryApplicationRepo::default());

        let state = AppState {
            users: users.clone(),
            jobs: jobs.clone(),
            applications: applications.clone(),
            tokens: Arc::new(TokenService::new(TEST_SECRET, None)),
            passwords: PasswordHasher::new(TEST_BCRYPT_COST),
            uploads: Arc::new(UploadStore::new(upload_dir.path(), max_file_bytes)),
        };

        Self {
            state,
            users,
            jobs,
            applications,
            upload_dir,
        }
    }

    /// The full application router (all middleware included).
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &config())
    }

    /// Inserts a user directly (password "pw"), bypassing the register route.
    pub async fn seed_user(&self, email: &str, role: Role) -> UserProfile {
        let password_hash = self.state.passwords.hash("pw").await.unwrap();
        self.users
            .create(NewUser {
                name: email.split('@').next().unwrap_or(email),
                email,
                password_hash: &password_hash,
                role,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &UserProfile) -> String {
        self.state.tokens.issue(user.id, user.role).unwrap()
    }

    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}
