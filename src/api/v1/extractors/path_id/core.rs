/*
 * Responsibility
 * - Path の String を typed id (Id<T>) として受ける
 * - UUID でなければ 400 INVALID_ID (AppError の envelope で返す)
 * 置かないもの
 *  - Job / Application といった具体リソース名 (types.rs 側)
 */
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::ids::Id;
use crate::state::AppState;

fn invalid_id() -> AppError {
    AppError::bad_request("INVALID_ID", "invalid id")
}

fn parse<T>(raw: &str) -> Result<Id<T>, AppError> {
    raw.parse::<Id<T>>().map_err(|_| invalid_id())
}

/// Single `{id}` path segment.
pub struct PathId<T>(pub Id<T>);

impl<T> FromRequestParts<AppState> for PathId<T>
where
    T: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_id())?;
        Ok(Self(parse(&raw)?))
    }
}

/// Two path segments, in route order (e.g. `/jobs/{job_id}/applications/{application_id}`).
pub struct PathIdPair<A, B>(pub Id<A>, pub Id<B>);

impl<A, B> FromRequestParts<AppState> for PathIdPair<A, B>
where
    A: Send + Sync,
    B: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path((a, b)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_id())?;
        Ok(Self(parse(&a)?, parse(&b)?))
    }
}

impl<T> std::fmt::Debug for PathId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PathId").field(&self.0).finish()
    }
}
