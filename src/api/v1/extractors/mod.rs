/*
 * Responsibility
 * - handler が受け取る extractor の公開口
 *   - auth_ctx: 認証済み Identity
 *   - path_id: typed path id
 *   - body: Json / Query (rejection を envelope に揃える)
 */
pub mod auth_ctx;
pub mod body;
pub mod path_id;

pub use auth_ctx::{CurrentIdentity, Identity};
pub use body::{JsonBody, QueryParams};
