/*
 * Responsibility
 * - applications の response DTO と status 更新 request
 * - 一覧は {total, data} で返す (employer 向けは applicant、applicant 向けは job を添える)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::application_repo::{ApplicationRecord, ApplicationStatus};
use crate::repos::job_repo::JobRecord;
use crate::repos::user_repo::UserProfile;
use crate::services::ids::{ApplicationId, JobId, UserId};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: ApplicationId,
    pub applicant_id: UserId,
    pub job_id: JobId,
    pub resume_path: String,
    pub cover_letter_path: Option<String>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApplicationRecord> for ApplicationResponse {
    fn from(a: ApplicationRecord) -> Self {
        Self {
            id: a.id,
            applicant_id: a.applicant_id,
            job_id: a.job_id,
            resume_path: a.resume_path,
            cover_letter_path: a.cover_letter_path,
            status: a.status,
            submitted_at: a.submitted_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<UserProfile> for ApplicantSummary {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: i64,
}

impl From<JobRecord> for JobSummary {
    fn from(job: JobRecord) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            salary: job.salary,
        }
    }
}

/// Employer view: application + applicant.
#[derive(Debug, Serialize)]
pub struct JobApplicationItem {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub applicant: Option<ApplicantSummary>,
}

/// Applicant view: application + job.
#[derive(Debug, Serialize)]
pub struct MyApplicationItem {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub job: Option<JobSummary>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse<T> {
    pub total: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for ApplicationListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_request_accepts_lowercase_names_only() {
        let req: UpdateStatusRequest = serde_json::from_str(r#"{"status":"shortlisted"}"#).unwrap();
        assert_eq!(req.status, ApplicationStatus::Shortlisted);

        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"hired"}"#).is_err());
        assert!(serde_json::from_str::<UpdateStatusRequest>("{}").is_err());
    }

    #[test]
    fn list_total_matches_data() {
        let list = ApplicationListResponse::from(vec![1, 2, 3]);
        assert_eq!(list.total, 3);
    }
}
