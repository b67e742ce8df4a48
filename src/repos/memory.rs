//! In-memory repositories for tests.
//!
//! Same contracts as the PostgreSQL repos: unique email, unique
//! (applicant, job), created_by never rewritten. Deleting a job does not
//! cascade to MemoryApplicationRepo.
use std::{cmp::Ordering, collections::HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::application_repo::{
    ApplicationRecord, ApplicationRepo, ApplicationStatus, NewApplication,
};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::job_repo::{
    JobChanges, JobFilter, JobPage, JobRecord, JobRepo, JobSort, JobSortField, NewJob, Page,
    SortOrder,
};
use crate::repos::user_repo::{NewUser, UserCredentials, UserProfile, UserRepo};
use crate::services::ids::{ApplicationId, JobId, UserId};

#[derive(Default)]
pub struct MemoryUserRepo {
    users: RwLock<HashMap<UserId, UserCredentials>>,
}

impl MemoryUserRepo {
    pub async fn remove(&self, id: UserId) {
        self.users.write().await.remove(&id);
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, user: NewUser<'_>) -> RepoResult<UserProfile> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.profile.email == user.email) {
            return Err(RepoError::Conflict);
        }

        let profile = UserProfile {
            id: UserId::new_v4(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(
            profile.id,
            UserCredentials {
                profile: profile.clone(),
                password_hash: user.password_hash.to_string(),
            },
        );
        Ok(profile)
    }

    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<UserProfile>> {
        Ok(self.users.read().await.get(&id).map(|u| u.profile.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.profile.email == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> RepoResult<Vec<UserProfile>> {
        let users = self.users.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| u.profile.clone()))
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryJobRepo {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
}

fn matches(job: &JobRecord, filter: &JobFilter) -> bool {
    if filter.job_type.is_some_and(|t| t != job.job_type) {
        return false;
    }
    if let Some(location) = &filter.location
        && !job
            .location
            .to_lowercase()
            .contains(&location.to_lowercase())
    {
        return false;
    }
    if filter.min_salary.is_some_and(|min| job.salary < min) {
        return false;
    }
    if filter.max_salary.is_some_and(|max| job.salary > max) {
        return false;
    }
    true
}

fn compare(a: &JobRecord, b: &JobRecord, field: JobSortField) -> Ordering {
    match field {
        JobSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        JobSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        JobSortField::Salary => a.salary.cmp(&b.salary),
        JobSortField::Title => a.title.cmp(&b.title),
        JobSortField::Company => a.company.cmp(&b.company),
        JobSortField::Location => a.location.cmp(&b.location),
    }
    .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
}

#[async_trait]
impl JobRepo for MemoryJobRepo {
    async fn create(&self, job: NewJob<'_>) -> RepoResult<JobRecord> {
        let now = Utc::now();
        let record = JobRecord {
            id: JobId::new_v4(),
            title: job.title.to_string(),
            description: job.description.to_string(),
            company: job.company.to_string(),
            location: job.location.to_string(),
            salary: job.salary,
            job_type: job.job_type,
            created_by: job.created_by,
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: JobId) -> RepoResult<Option<JobRecord>> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[JobId]) -> RepoResult<Vec<JobRecord>> {
        let jobs = self.jobs.read().await;
        Ok(ids.iter().filter_map(|id| jobs.get(id).cloned()).collect())
    }

    async fn list(&self, filter: &JobFilter, sort: JobSort, page: Page) -> RepoResult<JobPage> {
        let jobs = self.jobs.read().await;
        let mut selected: Vec<JobRecord> =
            jobs.values().filter(|j| matches(j, filter)).cloned().collect();

        selected.sort_by(|a, b| {
            let ord = compare(a, b, sort.field);
            match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = selected.len() as u64;
        let items = selected
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();

        Ok(JobPage { items, total })
    }

    async fn update(&self, id: JobId, changes: &JobChanges) -> RepoResult<Option<JobRecord>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(v) = &changes.title {
            job.title = v.clone();
        }
        if let Some(v) = &changes.description {
            job.description = v.clone();
        }
        if let Some(v) = &changes.company {
            job.company = v.clone();
        }
        if let Some(v) = &changes.location {
            job.location = v.clone();
        }
        if let Some(v) = changes.salary {
            job.salary = v;
        }
        if let Some(v) = changes.job_type {
            job.job_type = v;
        }
        job.updated_at = Utc::now();

        Ok(Some(job.clone()))
    }

    async fn delete(&self, id: JobId) -> RepoResult<bool> {
        Ok(self.jobs.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryApplicationRepo {
    applications: RwLock<HashMap<ApplicationId, ApplicationRecord>>,
}

impl MemoryApplicationRepo {
    fn sorted(mut records: Vec<ApplicationRecord>) -> Vec<ApplicationRecord> {
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        records
    }
}

#[async_trait]
impl ApplicationRepo for MemoryApplicationRepo {
    async fn create(&self, application: NewApplication<'_>) -> RepoResult<ApplicationRecord> {
        let mut applications = self.applications.write().await;
        if applications
            .values()
            .any(|a| a.applicant_id == application.applicant_id && a.job_id == application.job_id)
        {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now();
        let record = ApplicationRecord {
            id: ApplicationId::new_v4(),
            applicant_id: application.applicant_id,
            job_id: application.job_id,
            resume_path: application.resume_path.to_string(),
            cover_letter_path: application.cover_letter_path.map(str::to_string),
            status: ApplicationStatus::Pending,
            submitted_at: now,
            updated_at: now,
        };
        applications.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: ApplicationId) -> RepoResult<Option<ApplicationRecord>> {
        Ok(self.applications.read().await.get(&id).cloned())
    }

    async fn find_by_applicant_and_job(
        &self,
        applicant_id: UserId,
        job_id: JobId,
    ) -> RepoResult<Option<ApplicationRecord>> {
        Ok(self
            .applications
            .read()
            .await
            .values()
            .find(|a| a.applicant_id == applicant_id && a.job_id == job_id)
            .cloned())
    }

    async fn list_for_job(&self, job_id: JobId) -> RepoResult<Vec<ApplicationRecord>> {
        let applications = self.applications.read().await;
        Ok(Self::sorted(
            applications
                .values()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_applicant(
        &self,
        applicant_id: UserId,
    ) -> RepoResult<Vec<ApplicationRecord>> {
        let applications = self.applications.read().await;
        Ok(Self::sorted(
            applications
                .values()
                .filter(|a| a.applicant_id == applicant_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> RepoResult<Option<ApplicationRecord>> {
        let mut applications = self.applications.write().await;
        Ok(applications.get_mut(&id).map(|a| {
            a.status = status;
            a.updated_at = Utc::now();
            a.clone()
        }))
    }
}
