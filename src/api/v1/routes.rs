/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 公開 / employer / applicant の 3 つに分け、role guard → 認証の順で route_layer を掛ける
 *   (後から掛けた layer が外側: 認証 → role → handler)
 * - 同じ path の公開 GET と保護された PUT/DELETE は merge で 1 つの route にまとまる
 */
use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::api::v1::handlers::{
    applications::{apply, job_applications, my_applications, update_application_status},
    auth::{login, register},
    dashboard::dashboard,
    health::health,
    jobs::{create_job, delete_job, get_job, list_jobs, update_job},
};
use crate::middleware::auth::{access, roles};
use crate::services::auth::Role;
use crate::state::AppState;

const EMPLOYER: &[Role] = &[Role::Employer];
const APPLICANT: &[Role] = &[Role::Applicant];

fn public() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/jobs", get(list_jobs))
        .route("/jobs/{job_id}", get(get_job))
}

fn employer() -> Router<AppState> {
    let router = Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/{job_id}", put(update_job).delete(delete_job))
        .route("/jobs/{job_id}/applications", get(job_applications))
        .route(
            "/jobs/{job_id}/applications/{application_id}",
            patch(update_application_status),
        )
        .route("/protected/dashboard", get(dashboard));
    roles::apply(router, EMPLOYER)
}

fn applicant() -> Router<AppState> {
    let router = Router::new()
        .route("/applications/apply/{job_id}", post(apply))
        .route("/applications/mine", get(my_applications));
    roles::apply(router, APPLICANT)
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = access::apply(employer().merge(applicant()), state);
    public().merge(protected)
}
