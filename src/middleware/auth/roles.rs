//! Role guard: Identity.role が許可リストに含まれていなければ 403。
//!
//! access::apply より内側に掛ける (Identity が extensions に入っている前提)。
//! Identity が無い場合も 403 ROLE_DENIED で止める。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::Identity;
use crate::error::AppError;
use crate::services::auth::Role;
use crate::state::AppState;

#[derive(Clone, Copy, Debug)]
struct AllowedRoles(&'static [Role]);

/// 例：
/// ```ignore
/// let employer = roles::apply(employer, &[Role::Employer]);
/// ```
pub fn apply(router: Router<AppState>, allowed: &'static [Role]) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        AllowedRoles(allowed),
        guard,
    ))
}

async fn guard(
    State(AllowedRoles(allowed)): State<AllowedRoles>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(identity) = req.extensions().get::<Identity>() else {
        tracing::warn!(path = %req.uri().path(), "role guard reached without identity");
        return Err(AppError::RoleDenied);
    };

    if !allowed.contains(&identity.role) {
        tracing::info!(
            user_id = %identity.user_id,
            role = %identity.role,
            path = %req.uri().path(),
            "role denied"
        );
        return Err(AppError::RoleDenied);
    }

    Ok(next.run(req).await)
}
