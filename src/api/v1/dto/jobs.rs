/*
 * Responsibility
 * - jobs の request/response DTO
 * - list query → JobFilter / JobSort / Page への変換 (page >= 1, 1 <= limit <= 100)
 * - createdBy は request からは受け取らない (常に認証済み user)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::repos::job_repo::{
    JobChanges, JobFilter, JobRecord, JobSort, JobSortField, JobType, Page, SortOrder,
};
use crate::repos::user_repo::UserProfile;
use crate::services::ids::{JobId, UserId};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

fn missing_fields() -> AppError {
    AppError::bad_request("MISSING_FIELDS", "Please fill in all required fields")
}

fn check_salary(salary: Option<i64>) -> Result<(), AppError> {
    if salary.is_some_and(|s| s < 0) {
        return Err(AppError::bad_request(
            "INVALID_SALARY",
            "salary must be >= 0",
        ));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub salary: Option<i64>,
    pub job_type: Option<JobType>,
}

impl CreateJobRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [&self.title, &self.description, &self.company, &self.location];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(missing_fields());
        }
        check_salary(self.salary)
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<i64>,
    pub job_type: Option<JobType>,
}

impl UpdateJobRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let provided = [&self.title, &self.description, &self.company, &self.location];
        // 指定された項目は空にできない
        if provided.iter().flat_map(|v| v.as_ref()).any(|v| v.trim().is_empty()) {
            return Err(missing_fields());
        }
        check_salary(self.salary)
    }

    pub fn into_changes(self) -> JobChanges {
        JobChanges {
            title: trimmed(self.title),
            description: trimmed(self.description),
            company: trimmed(self.company),
            location: trimmed(self.location),
            salary: self.salary,
            job_type: self.job_type,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListJobsQuery {
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<JobSortField>,
    pub order: Option<SortOrder>,
}

impl ListJobsQuery {
    pub fn filter(&self) -> JobFilter {
        JobFilter {
            job_type: self.job_type,
            location: self
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
            min_salary: self.min_salary,
            max_salary: self.max_salary,
        }
    }

    pub fn sort(&self) -> JobSort {
        JobSort {
            field: self.sort_by.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        }
    }

    pub fn page(&self) -> Page {
        Page {
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub salary: i64,
    pub job_type: JobType,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<JobRecord> for JobResponse {
    fn from(job: JobRecord) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            salary: job.salary,
            job_type: job.job_type,
            created_by: job.created_by,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<UserProfile> for EmployerSummary {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListItem {
    #[serde(flatten)]
    pub job: JobResponse,
    /// None when the employer account no longer exists.
    pub employer: Option<EmployerSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_jobs: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

impl Pagination {
    pub fn new(total_jobs: u64, page: Page) -> Self {
        Self {
            total_jobs,
            total_pages: total_jobs.div_ceil(u64::from(page.limit)),
            current_page: page.page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub data: Vec<JobListItem>,
    pub pagination: Pagination,
}
