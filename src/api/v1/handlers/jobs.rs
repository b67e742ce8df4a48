/*
 * Responsibility
 * - /jobs 系 handler
 *   - 一覧 / 詳細は公開
 *   - 作成は employer、更新 / 削除は employer かつ作成者本人 (ensure_owner)
 * - createdBy は常に認証済み user の id (body からは受けない)
 */
use std::collections::{HashMap, HashSet};

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::{
            MessageResponse,
            jobs::{
                CreateJobRequest, EmployerSummary, JobListItem, JobListResponse, JobResponse,
                ListJobsQuery, Pagination, UpdateJobRequest,
            },
        },
        extractors::{CurrentIdentity, JsonBody, QueryParams, path_id::{JobPathId, PathId}},
    },
    error::AppError,
    repos::job_repo::{JobType, NewJob},
    services::auth::ownership::ensure_owner,
    services::ids::UserId,
    state::AppState,
};

pub async fn list_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListJobsQuery>,
) -> Result<Json<JobListResponse>, AppError> {
    let page = query.page();
    let result = state
        .jobs
        .list(&query.filter(), query.sort(), page)
        .await?;

    let employer_ids: Vec<UserId> = result
        .items
        .iter()
        .map(|j| j.created_by)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let employers: HashMap<UserId, EmployerSummary> = state
        .users
        .find_many(&employer_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, EmployerSummary::from(u)))
        .collect();

    let data = result
        .items
        .into_iter()
        .map(|job| JobListItem {
            employer: employers.get(&job.created_by).cloned(),
            job: job.into(),
        })
        .collect();

    Ok(Json(JobListResponse {
        data,
        pagination: Pagination::new(result.total, page),
    }))
}

pub async fn get_job(
    State(state): State<AppState>,
    PathId(job_id): JobPathId,
) -> Result<Json<JobResponse>, AppError> {
    let job = state
        .jobs
        .get(job_id)
        .await?
        .ok_or_else(|| AppError::not_found("job"))?;

    Ok(Json(job.into()))
}

pub async fn create_job(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    JsonBody(req): JsonBody<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    req.validate()?;

    let job = state
        .jobs
        .create(NewJob {
            title: req.title.trim(),
            description: req.description.trim(),
            company: req.company.trim(),
            location: req.location.trim(),
            salary: req.salary.unwrap_or(0),
            job_type: req.job_type.unwrap_or(JobType::FullTime),
            created_by: identity.user_id,
        })
        .await?;

    tracing::info!(job_id = %job.id, user_id = %identity.user_id, "job created");
    Ok((StatusCode::CREATED, Json(job.into())))
}

pub async fn update_job(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    PathId(job_id): JobPathId,
    JsonBody(req): JsonBody<UpdateJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    ensure_owner(state.jobs.get(job_id).await?, identity.user_id)?;
    req.validate()?;

    let job = state
        .jobs
        .update(job_id, &req.into_changes())
        .await?
        .ok_or_else(|| AppError::not_found("job"))?;

    Ok(Json(job.into()))
}

pub async fn delete_job(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    PathId(job_id): JobPathId,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_owner(state.jobs.get(job_id).await?, identity.user_id)?;

    // applications の行は FK cascade で消える。ファイルはここで消す
    let applications = state.applications.list_for_job(job_id).await?;

    if !state.jobs.delete(job_id).await? {
        return Err(AppError::not_found("job"));
    }

    for application in &applications {
        state.uploads.remove(&application.resume_path).await;
        if let Some(path) = &application.cover_letter_path {
            state.uploads.remove(path).await;
        }
    }

    tracing::info!(
        job_id = %job_id,
        user_id = %identity.user_id,
        applications = applications.len(),
        "job deleted"
    );
    Ok(Json(MessageResponse::new("Job deleted successfully")))
}
