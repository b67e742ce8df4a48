/**
 * Responsibility
 *  - リソースごとの「意味付き path id 型」を宣言する
 *  - 新しいリソースを足すときはここに alias を追加する
 */
use super::core::{PathId, PathIdPair};
use crate::services::ids::{ApplicationTag, JobTag};

// jobs
pub type JobPathId = PathId<JobTag>;

// applications (always nested under a job)
pub type JobApplicationPathIds = PathIdPair<JobTag, ApplicationTag>;
