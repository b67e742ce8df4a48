pub mod application_repo;
pub mod error;
pub mod job_repo;
#[cfg(test)]
pub mod memory;
pub mod user_repo;
