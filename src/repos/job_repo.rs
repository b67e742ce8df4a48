/*
 * Responsibility
 * - jobs CRUD + filtered / sorted / paginated listing
 * - created_by is written once on insert and never updated
 * - applications are removed by FK (ON DELETE CASCADE) when a job is deleted
 */
use std::{fmt, str::FromStr};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::auth::ownership::Owned;
use crate::services::ids::{JobId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobType {
    #[default]
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    #[serde(rename = "Contract")]
    Contract,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-Time",
            JobType::PartTime => "Part-Time",
            JobType::Contract => "Contract",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full-Time" => Ok(JobType::FullTime),
            "Part-Time" => Ok(JobType::PartTime),
            "Contract" => Ok(JobType::Contract),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobRecord {
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

impl Owned for JobRecord {
    const RESOURCE: &'static str = "job";

    fn owner_id(&self) -> UserId {
        self.created_by
    }
}

#[derive(Debug)]
pub struct NewJob<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub salary: i64,
    pub job_type: JobType,
    pub created_by: UserId,
}

/// Partial update. `None` leaves the column unchanged; the owner is not editable.
#[derive(Debug, Default, Clone)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<i64>,
    pub job_type: Option<JobType>,
}

#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub job_type: Option<JobType>,
    /// Case-insensitive substring match.
    pub location: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Salary,
    Title,
    Company,
    Location,
}

impl JobSortField {
    // Whitelisted column names; never interpolate user input into ORDER BY.
    fn column(&self) -> &'static str {
        match self {
            JobSortField::CreatedAt => "created_at",
            JobSortField::UpdatedAt => "updated_at",
            JobSortField::Salary => "salary",
            JobSortField::Title => "title",
            JobSortField::Company => "company",
            JobSortField::Location => "location",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JobSort {
    pub field: JobSortField,
    pub order: SortOrder,
}

/// 1-based page with a page size of at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone)]
pub struct JobPage {
    pub items: Vec<JobRecord>,
    pub total: u64,
}

#[async_trait]
pub trait JobRepo: Send + Sync {
    async fn create(&self, job: NewJob<'_>) -> RepoResult<JobRecord>;

    async fn get(&self, id: JobId) -> RepoResult<Option<JobRecord>>;

    /// Missing ids are skipped; order is unspecified.
    async fn find_many(&self, ids: &[JobId]) -> RepoResult<Vec<JobRecord>>;

    async fn list(&self, filter: &JobFilter, sort: JobSort, page: Page) -> RepoResult<JobPage>;

    async fn update(&self, id: JobId, changes: &JobChanges) -> RepoResult<Option<JobRecord>>;

    async fn delete(&self, id: JobId) -> RepoResult<bool>;
}

#[derive(Debug, Clone, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    description: String,
    company: String,
    location: String,
    salary: i64,
    job_type: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = RepoError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(JobRecord {
            id: JobId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            company: row.company,
            location: row.location,
            salary: row.salary,
            job_type: row.job_type.parse().map_err(RepoError::Corrupt)?,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const JOB_COLUMNS: &str =
    "id, title, description, company, location, salary, job_type, created_by, created_at, updated_at";

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    qb.push(" WHERE TRUE");
    if let Some(job_type) = filter.job_type {
        qb.push(" AND job_type = ").push_bind(job_type.as_str());
    }
    if let Some(location) = &filter.location {
        qb.push(" AND location ILIKE ")
            .push_bind(format!("%{}%", escape_like(location)))
            .push(" ESCAPE '\\'");
    }
    if let Some(min) = filter.min_salary {
        qb.push(" AND salary >= ").push_bind(min);
    }
    if let Some(max) = filter.max_salary {
        qb.push(" AND salary <= ").push_bind(max);
    }
}

#[derive(Clone, Debug)]
pub struct PgJobRepo {
    pool: PgPool,
}

impl PgJobRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepo for PgJobRepo {
    async fn create(&self, job: NewJob<'_>) -> RepoResult<JobRecord> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (id, title, description, company, location, salary, job_type, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(job.title)
        .bind(job.description)
        .bind(job.company)
        .bind(job.location)
        .bind(job.salary)
        .bind(job.job_type.as_str())
        .bind(job.created_by.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: JobId) -> RepoResult<Option<JobRecord>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobRecord::try_from).transpose()
    }

    async fn find_many(&self, ids: &[JobId]) -> RepoResult<Vec<JobRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(JobId::as_uuid).collect();

        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = ANY($1)"
        ))
        .bind(uuids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobRecord::try_from).collect()
    }

    async fn list(&self, filter: &JobFilter, sort: JobSort, page: Page) -> RepoResult<JobPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));
        push_filters(&mut select, filter);
        // id as tie-breaker keeps pages stable
        select.push(format!(
            " ORDER BY {} {}, id {}",
            sort.field.column(),
            sort.order.sql(),
            sort.order.sql()
        ));
        select.push(" LIMIT ").push_bind(i64::from(page.limit));
        select.push(" OFFSET ").push_bind(page.offset() as i64);

        let rows = select
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?;
        let items = rows
            .into_iter()
            .map(JobRecord::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(JobPage {
            items,
            total: total.max(0) as u64,
        })
    }

    async fn update(&self, id: JobId, changes: &JobChanges) -> RepoResult<Option<JobRecord>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                company = COALESCE($4, company),
                location = COALESCE($5, location),
                salary = COALESCE($6, salary),
                job_type = COALESCE($7, job_type),
                updated_at = now()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.company.as_deref())
        .bind(changes.location.as_deref())
        .bind(changes.salary)
        .bind(changes.job_type.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobRecord::try_from).transpose()
    }

    async fn delete(&self, id: JobId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("new york"), "new york");
        assert_eq!(escape_like("100%_remote\\"), "100\\%\\_remote\\\\");
    }

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(Page { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(Page { page: 3, limit: 25 }.offset(), 50);
    }

    #[test]
    fn job_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&JobType::PartTime).unwrap(),
            "\"Part-Time\""
        );
        assert_eq!("Contract".parse::<JobType>().unwrap(), JobType::Contract);
        assert!("full-time".parse::<JobType>().is_err());
    }
}
