/*
 * Responsibility
 * - Config 読み込み → 依存生成 (pool / migrations / services) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / request id / body limit / timeout / trace)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::repos::{
    application_repo::PgApplicationRepo, job_repo::PgJobRepo, user_repo::PgUserRepo,
};
use crate::services::auth::{PasswordHasher, TokenService};
use crate::services::uploads::UploadStore;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG を優先。例:
    // RUST_LOG=info,job_board=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr が見えない起動方法でも panic を残す
        tracing::error!(?info, "panic");

        // development: 即死させて気づけるようにする / production: default hook
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "starting API in {:?} mode on {}", config.app_env, config.addr);

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_file_bytes);
    uploads
        .ensure_dir()
        .await
        .with_context(|| format!("failed to create {}", uploads.dir().display()))?;

    Ok(AppState {
        users: Arc::new(PgUserRepo::new(pool.clone())),
        jobs: Arc::new(PgJobRepo::new(pool.clone())),
        applications: Arc::new(PgApplicationRepo::new(pool)),
        tokens: Arc::new(TokenService::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl_seconds,
        )),
        passwords: PasswordHasher::new(config.bcrypt_cost),
        uploads: Arc::new(uploads),
    })
}

async fn not_found() -> AppError {
    AppError::not_found("route")
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .fallback(not_found)
        .with_state(state);

    let router = middleware::security_headers::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}
