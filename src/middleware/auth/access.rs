//! Bearer token 検証 → user を store から再取得 → Identity を extensions に入れる
//!
//! NoToken → TokenPresent → {Verified, Rejected}
//! - header が無い / "Bearer " で始まらない → 401 MISSING_TOKEN (downstream は呼ばない)
//! - 署名/payload の検証失敗 → 401 INVALID_TOKEN
//! - token は正しいが user が存在しない → 401 UNKNOWN_SUBJECT
//! - 成功 → store から取った最新の role で Identity を作る (token の role は信用しない)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::Identity;
use crate::error::AppError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// 渡された router の全 route に認証を掛ける。
///
/// `route_layer` なので、存在しない path は 401 ではなく 404 のまま。
/// 例：
/// ```ignore
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, authenticate))
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or(AppError::MissingToken)?;

    let verified = match state.tokens.verify(token) {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(error = %err, "access token verification failed");
            return Err(AppError::InvalidToken);
        }
    };

    // One lookup per request; a role change or deleted account applies immediately.
    let user = state
        .users
        .find_by_id(verified.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %verified.user_id, "token subject no longer exists");
            AppError::UnknownSubject
        })?;

    if user.role != verified.role {
        tracing::debug!(
            user_id = %user.id,
            token_role = %verified.role,
            current_role = %user.role,
            "role changed since token issuance"
        );
    }

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(Identity::from(user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{Extension, Router, body::Body, http::Request, http::StatusCode, routing::get};
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::CurrentIdentity;
    use crate::services::auth::{Role, TokenService};
    use crate::services::ids::UserId;
    use crate::test_support::TestApp;

    fn guarded_router(app: &TestApp, hits: Arc<AtomicUsize>) -> Router {
        let router = Router::new().route(
            "/guarded",
            get(
                |Extension(hits): Extension<Arc<AtomicUsize>>,
                 CurrentIdentity(identity): CurrentIdentity| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    format!("{}:{}", identity.role, identity.user_id)
                },
            ),
        );
        apply(router, app.state.clone())
            .layer(Extension(hits))
            .with_state(app.state.clone())
    }

    async fn call(router: Router, authorization: Option<&str>) -> StatusCode {
        let mut req = Request::builder().uri("/guarded");
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }
        router
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn missing_or_non_bearer_header_is_rejected_before_the_handler() {
        let app = TestApp::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for header in [None, Some("Basic xyz"), Some("bearer abc"), Some("Bearer"), Some("")] {
            let status = call(guarded_router(&app, hits.clone()), header).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_or_foreign_tokens_are_rejected() {
        let app = TestApp::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let user = app.seed_user("ann@x.com", Role::Employer).await;

        let foreign = TokenService::new(b"some-other-secret", None)
            .issue(user.id, Role::Employer)
            .unwrap();

        for value in [
            "Bearer ".to_string(),
            "Bearer garbage".to_string(),
            format!("Bearer {foreign}"),
        ] {
            let status = call(guarded_router(&app, hits.clone()), Some(&value)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_rejected() {
        let app = TestApp::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let ghost = app.state.tokens.issue(UserId::new_v4(), Role::Employer).unwrap();

        let status = call(guarded_router(&app, hits.clone()), Some(&format!("Bearer {ghost}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deleted_user_loses_access_with_a_still_valid_token() {
        let app = TestApp::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let user = app.seed_user("gone@x.com", Role::Applicant).await;
        let token = app.token_for(&user);

        let status = call(guarded_router(&app, hits.clone()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);

        app.users.remove(user.id).await;
        let status = call(guarded_router(&app, hits.clone()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn valid_token_attaches_identity_from_the_store() {
        let app = TestApp::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let user = app.seed_user("ann@x.com", Role::Employer).await;
        // Token claims a different role; the stored role wins.
        let token = app.state.tokens.issue(user.id, Role::Applicant).unwrap();

        let res = guarded_router(&app, hits.clone())
            .oneshot(
                Request::builder()
                    .uri("/guarded")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            format!("employer:{}", user.id)
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
