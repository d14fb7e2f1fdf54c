//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in account, optionally of a
//! given role, in route handlers.
//!
//! Unauthenticated requests are redirected to the login page, except under
//! `/api/` where they get `401` with a JSON body. Signed-in accounts with the
//! wrong role get `403`.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use night_market_core::Role;

use crate::models::{CurrentUser, keys};

/// Error returned when a request lacks the required account or role.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page (for HTML requests).
    RedirectToLogin(&'static str),
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in, but with a role that may not use this route.
    Forbidden { api: bool },
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(path) => Redirect::to(path).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            Self::Forbidden { api: true } => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": "Forbidden" })),
            )
                .into_response(),
            Self::Forbidden { api: false } => {
                (StatusCode::FORBIDDEN, "このページへのアクセス権限がありません").into_response()
            }
        }
    }
}

/// Full request path. Nested routers see the path with their prefix removed.
fn request_path(parts: &Parts) -> &str {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |original| original.0.path())
}

fn is_api(parts: &Parts) -> bool {
    request_path(parts).starts_with("/api/")
}

/// Login page for an HTML path: the portal of the dashboard being visited,
/// or the portal chooser.
#[must_use]
pub fn login_path_for(path: &str) -> &'static str {
    if path.starts_with("/dashboard/admin") {
        "/login/admin"
    } else if path.starts_with("/dashboard/staff") {
        "/login/staff"
    } else if path.starts_with("/dashboard/user") {
        "/login/user"
    } else {
        "/login"
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

async fn require_user(parts: &Parts) -> Result<CurrentUser, AuthRejection> {
    session_user(parts).await.ok_or_else(|| {
        if is_api(parts) {
            AuthRejection::Unauthorized
        } else {
            AuthRejection::RedirectToLogin(login_path_for(request_path(parts)))
        }
    })
}

async fn require_role(
    parts: &Parts,
    allowed: impl Fn(Role) -> bool,
) -> Result<CurrentUser, AuthRejection> {
    let user = require_user(parts).await?;
    if !allowed(user.role) {
        tracing::warn!(
            user_id = %user.id,
            role = %user.role,
            path = %request_path(parts),
            "Role not permitted"
        );
        return Err(AuthRejection::Forbidden { api: is_api(parts) });
    }
    Ok(user)
}

/// Extractor that requires a signed-in account of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_user(parts).await.map(Self)
    }
}

/// Extractor that requires a vendor (`USER`) account.
pub struct RequireVendor(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireVendor
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, |role| role == Role::User).await.map(Self)
    }
}

/// Extractor that requires a reviewer: `STAFF` or `ADMIN`.
pub struct RequireStaff(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::can_review).await.map(Self)
    }
}

/// Extractor that requires an `ADMIN` account.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, |role| role == Role::Admin)
            .await
            .map(Self)
    }
}

/// Extractor that optionally gets the signed-in account.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

/// Store the signed-in account in the session.
///
/// The session ID is cycled first so a pre-login ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, header},
        middleware::{self, Next},
        routing::{get, patch},
    };
    use night_market_core::{Email, UserId};
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    async fn staff_only(RequireStaff(user): RequireStaff) -> String {
        user.display_name().to_owned()
    }

    /// Routes nested the way the portal mounts them.
    fn nested_routes() -> Router {
        Router::new()
            .nest(
                "/api",
                Router::new().route("/forms/{id}/status", patch(staff_only)),
            )
            .nest(
                "/dashboard/admin",
                Router::new().route("/", get(staff_only)),
            )
    }

    /// Attach a session signed in as a vendor.
    async fn as_vendor(mut req: axum::extract::Request, next: Next) -> Response {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let vendor = CurrentUser {
            id: UserId::generate(),
            email: Email::parse("vendor@test.com").unwrap(),
            name: None,
            role: Role::User,
        };
        session.insert(keys::CURRENT_USER, &vendor).await.unwrap();
        req.extensions_mut().insert(session);
        next.run(req).await
    }

    async fn json_error(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["error"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_nested_dashboard_redirects_to_its_portal() {
        let response = nested_routes()
            .oneshot(Request::get("/dashboard/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login/admin"
        );
    }

    #[tokio::test]
    async fn test_nested_api_without_session_is_unauthorized() {
        let response = nested_routes()
            .oneshot(
                Request::patch("/api/forms/8a4f5e1c-7d2b-4c3a-9e8f-1a2b3c4d5e6f/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_error(response).await, "Unauthorized");
    }

    #[tokio::test]
    async fn test_nested_api_wrong_role_is_json_forbidden() {
        let response = nested_routes()
            .layer(middleware::from_fn(as_vendor))
            .oneshot(
                Request::patch("/api/forms/8a4f5e1c-7d2b-4c3a-9e8f-1a2b3c4d5e6f/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_error(response).await, "Forbidden");
    }

    #[tokio::test]
    async fn test_nested_page_wrong_role_is_plain_forbidden() {
        let response = nested_routes()
            .layer(middleware::from_fn(as_vendor))
            .oneshot(Request::get("/dashboard/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response
            .headers()
            .get(header::CONTENT_TYPE)
            .is_some_and(|v| v.as_bytes().starts_with(b"application/json")));
    }

    #[test]
    fn test_login_path_for_dashboards() {
        assert_eq!(login_path_for("/dashboard/admin/applications"), "/login/admin");
        assert_eq!(login_path_for("/dashboard/staff"), "/login/staff");
        assert_eq!(login_path_for("/dashboard/user/forms/abc"), "/login/user");
        assert_eq!(login_path_for("/dashboard"), "/login");
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden { api: false }.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthRejection::RedirectToLogin("/login").into_response().status(),
            StatusCode::SEE_OTHER
        );
    }
}
