/*
 * Responsibility
 * - 応募 (multipart: resume 必須 / coverLetter 任意) と応募一覧、status 更新
 * - applicant: apply / mine
 * - employer: 自分の job の applications のみ (ensure_owner で job の作成者を確認)
 * - insert に失敗したら保存済みファイルを消す
 */
use std::collections::{HashMap, HashSet};

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::applications::{
            ApplicantSummary, ApplicationListResponse, ApplicationResponse, JobApplicationItem,
            JobSummary, MyApplicationItem, UpdateStatusRequest,
        },
        extractors::{
            CurrentIdentity, JsonBody,
            path_id::{JobApplicationPathIds, JobPathId, PathId, PathIdPair},
        },
    },
    error::AppError,
    repos::{application_repo::NewApplication, error::RepoError},
    services::{
        auth::ownership::ensure_owner,
        ids::{JobId, UserId},
        uploads::UploadStore,
    },
    state::AppState,
};

const RESUME_FIELD: &str = "resume";
const COVER_LETTER_FIELD: &str = "coverLetter";

fn already_applied() -> AppError {
    AppError::conflict("ALREADY_APPLIED", "You already applied to this job")
}

fn multipart_error(err: MultipartError, uploads: &UploadStore) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge {
            limit: uploads.max_file_bytes(),
        };
    }
    AppError::bad_request("INVALID_MULTIPART", err.body_text())
}

struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

#[derive(Default)]
struct ApplicationForm {
    resume: Option<UploadedFile>,
    cover_letter: Option<UploadedFile>,
}

/// Reads the form and validates each file; nothing is written to disk here.
async fn read_form(
    mut multipart: Multipart,
    uploads: &UploadStore,
) -> Result<ApplicationForm, AppError> {
    let mut form = ApplicationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, uploads))?
    {
        let slot = match field.name() {
            Some(RESUME_FIELD) => &mut form.resume,
            Some(COVER_LETTER_FIELD) => &mut form.cover_letter,
            // 未知の field は読み捨てる
            _ => continue,
        };
        if slot.is_some() {
            return Err(AppError::bad_request(
                "TOO_MANY_FILES",
                "each file field accepts a single file",
            ));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, uploads))?;

        uploads.check(&file_name, content_type.as_deref(), bytes.len())?;
        *slot = Some(UploadedFile { file_name, bytes });
    }

    Ok(form)
}

pub async fn apply(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    PathId(job_id): JobPathId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let multipart = multipart
        .map_err(|rej| AppError::bad_request("INVALID_MULTIPART", rej.body_text()))?;

    if state.jobs.get(job_id).await?.is_none() {
        return Err(AppError::not_found("job"));
    }

    // form の検証 (必須 / 種別 / サイズ) を先に済ませてから重複を見る
    let form = read_form(multipart, &state.uploads).await?;
    let Some(resume) = form.resume else {
        return Err(AppError::bad_request("MISSING_FIELDS", "Resume is required"));
    };

    // 事前チェック。同時リクエストは unique 制約 (Conflict) で止まる
    if state
        .applications
        .find_by_applicant_and_job(identity.user_id, job_id)
        .await?
        .is_some()
    {
        return Err(already_applied());
    }

    let mut stored: Vec<String> = Vec::with_capacity(2);
    let result = store_and_insert(
        &state,
        identity.user_id,
        job_id,
        resume,
        form.cover_letter,
        &mut stored,
    )
    .await;

    match result {
        Ok(application) => {
            tracing::info!(
                application_id = %application.id,
                job_id = %job_id,
                user_id = %identity.user_id,
                "application submitted"
            );
            Ok((StatusCode::CREATED, Json(application)))
        }
        Err(err) => {
            for path in &stored {
                state.uploads.remove(path).await;
            }
            Err(err)
        }
    }
}

async fn store_and_insert(
    state: &AppState,
    applicant_id: UserId,
    job_id: JobId,
    resume: UploadedFile,
    cover_letter: Option<UploadedFile>,
    stored: &mut Vec<String>,
) -> Result<ApplicationResponse, AppError> {
    let resume_path = state.uploads.save(&resume.file_name, &resume.bytes).await?;
    stored.push(resume_path.clone());

    let cover_letter_path = match cover_letter {
        Some(file) => {
            let name = state.uploads.save(&file.file_name, &file.bytes).await?;
            stored.push(name.clone());
            Some(name)
        }
        None => None,
    };

    let application = state
        .applications
        .create(NewApplication {
            applicant_id,
            job_id,
            resume_path: &resume_path,
            cover_letter_path: cover_letter_path.as_deref(),
        })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => already_applied(),
            other => other.into(),
        })?;

    Ok(application.into())
}

pub async fn my_applications(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<ApplicationListResponse<MyApplicationItem>>, AppError> {
    let applications = state
        .applications
        .list_for_applicant(identity.user_id)
        .await?;

    let job_ids: Vec<JobId> = applications
        .iter()
        .map(|a| a.job_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let jobs: HashMap<JobId, JobSummary> = state
        .jobs
        .find_many(&job_ids)
        .await?
        .into_iter()
        .map(|j| (j.id, JobSummary::from(j)))
        .collect();

    let data: Vec<MyApplicationItem> = applications
        .into_iter()
        .map(|a| MyApplicationItem {
            job: jobs.get(&a.job_id).cloned(),
            application: a.into(),
        })
        .collect();

    Ok(Json(data.into()))
}

pub async fn job_applications(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    PathId(job_id): JobPathId,
) -> Result<Json<ApplicationListResponse<JobApplicationItem>>, AppError> {
    ensure_owner(state.jobs.get(job_id).await?, identity.user_id)?;

    let applications = state.applications.list_for_job(job_id).await?;

    let applicant_ids: Vec<UserId> = applications
        .iter()
        .map(|a| a.applicant_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let applicants: HashMap<UserId, ApplicantSummary> = state
        .users
        .find_many(&applicant_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, ApplicantSummary::from(u)))
        .collect();

    let data: Vec<JobApplicationItem> = applications
        .into_iter()
        .map(|a| JobApplicationItem {
            applicant: applicants.get(&a.applicant_id).cloned(),
            application: a.into(),
        })
        .collect();

    Ok(Json(data.into()))
}

pub async fn update_application_status(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    PathIdPair(job_id, application_id): JobApplicationPathIds,
    JsonBody(req): JsonBody<UpdateStatusRequest>,
) -> Result<Json<ApplicationResponse>, AppError> {
    ensure_owner(state.jobs.get(job_id).await?, identity.user_id)?;

    // 別の job の application は存在しないものとして扱う
    let belongs_to_job = state
        .applications
        .get(application_id)
        .await?
        .is_some_and(|a| a.job_id == job_id);
    if !belongs_to_job {
        return Err(AppError::not_found("application"));
    }

    let application = state
        .applications
        .update_status(application_id, req.status)
        .await?
        .ok_or_else(|| AppError::not_found("application"))?;

    tracing::info!(
        application_id = %application_id,
        status = %application.status,
        user_id = %identity.user_id,
        "application status updated"
    );
    Ok(Json(application.into()))
}
