/*
 * Responsibility
 * - Json / Query の rejection を AppError (400 + envelope) に揃える
 * - axum 既定の text/plain 422 / 415 を handler に漏らさない
 */
use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;

/// `Json<T>`; malformed bodies become 400 `INVALID_BODY`.
pub struct JsonBody<T>(pub T);

impl<T> FromRequest<AppState> for JsonBody<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej| AppError::bad_request("INVALID_BODY", rej.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query<T>`; unparsable query strings become 400 `INVALID_QUERY`.
pub struct QueryParams<T>(pub T);

impl<T> FromRequestParts<AppState> for QueryParams<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rej| AppError::bad_request("INVALID_QUERY", rej.body_text()))?;
        Ok(Self(value))
    }
}
