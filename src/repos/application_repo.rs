/*
 * Responsibility
 * - applications (job applications with uploaded files)
 * - one application per (applicant, job): enforced by a UNIQUE constraint,
 *   a second insert returns RepoError::Conflict
 */
use std::{fmt, str::FromStr};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::ids::{ApplicationId, JobId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Shortlisted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub applicant_id: UserId,
    pub job_id: JobId,
    /// Stored name under the upload dir.
    pub resume_path: String,
    pub cover_letter_path: Option<String>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewApplication<'a> {
    pub applicant_id: UserId,
    pub job_id: JobId,
    pub resume_path: &'a str,
    pub cover_letter_path: Option<&'a str>,
}

#[async_trait]
pub trait ApplicationRepo: Send + Sync {
    async fn create(&self, application: NewApplication<'_>) -> RepoResult<ApplicationRecord>;

    async fn get(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>>;

    async fn find_by_applicant_and_job(
        &self,
        applicant_id: UserId,
        job_id: JobId,
    ) -> RepoResult<Option<ApplicationRecord>>;

    async fn list_for_job(&self, job_id: JobId) -> RepoResult<Vec<ApplicationRecord>>;

    async fn list_for_applicant(&self, applicant_id: UserId)
    -> RepoResult<Vec<ApplicationRecord>>;

    async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> RepoResult<Option<ApplicationRecord>>;
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    applicant_id: Uuid,
    job_id: Uuid,
    resume_path: String,
    cover_letter_path: Option<String>,
    status: String,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for ApplicationRecord {
    type Error = RepoError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(ApplicationRecord {
            id: ApplicationId::from_uuid(row.id),
            applicant_id: UserId::from_uuid(row.applicant_id),
            job_id: JobId::from_uuid(row.job_id),
            resume_path: row.resume_path,
            cover_letter_path: row.cover_letter_path,
            status: row.status.parse().map_err(RepoError::Corrupt)?,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
        })
    }
}

const APPLICATION_COLUMNS: &str = "id, applicant_id, job_id, resume_path, cover_letter_path, status, submitted_at, updated_at";

fn into_records(rows: Vec<ApplicationRow>) -> RepoResult<Vec<ApplicationRecord>> {
    rows.into_iter().map(ApplicationRecord::try_from).collect()
}

#[derive(Clone, Debug)]
pub struct PgApplicationRepo {
    pool: PgPool,
}

impl PgApplicationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepo for PgApplicationRepo {
    async fn create(&self, application: NewApplication<'_>) -> RepoResult<ApplicationRecord> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (id, applicant_id, job_id, resume_path, cover_letter_path)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(application.applicant_id.as_uuid())
        .bind(application.job_id.as_uuid())
        .bind(application.resume_path)
        .bind(application.cover_letter_path)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationRecord::try_from).transpose()
    }

    async fn find_by_applicant_and_job(
        &self,
        applicant_id: UserId,
        job_id: JobId,
    ) -> RepoResult<Option<ApplicationRecord>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE applicant_id = $1 AND job_id = $2"
        ))
        .bind(applicant_id.as_uuid())
        .bind(job_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationRecord::try_from).transpose()
    }

    async fn list_for_job(&self, job_id: JobId) -> RepoResult<Vec<ApplicationRecord>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = $1 ORDER BY submitted_at DESC"
        ))
        .bind(job_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn list_for_applicant(
        &self,
        applicant_id: UserId,
    ) -> RepoResult<Vec<ApplicationRecord>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE applicant_id = $1 ORDER BY submitted_at DESC"
        ))
        .bind(applicant_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> RepoResult<Option<ApplicationRecord>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationRecord::try_from).transpose()
    }
}
