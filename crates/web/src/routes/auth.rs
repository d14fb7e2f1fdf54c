//! Authentication route handlers.
//!
//! Each role signs in through its own portal (`/login/user`, `/login/staff`,
//! `/login/admin`). Admins may also use the staff portal.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use night_market_core::Role;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::services::auth::{AuthError, portal_accepts};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A login portal link on the chooser page.
#[derive(Debug, Clone)]
pub struct PortalLink {
    pub href: String,
    pub label: &'static str,
    pub description: &'static str,
}

/// Portal chooser template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/portals.html")]
pub struct PortalsTemplate {
    pub event_name: String,
    pub portals: Vec<PortalLink>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub event_name: String,
    pub portal: &'static str,
    pub role_label: &'static str,
    pub email: String,
    pub error: Option<&'static str>,
}

const fn portal_description(role: Role) -> &'static str {
    match role {
        Role::User => "出店の申込と出店日の登録はこちら",
        Role::Staff => "申込内容の確認と審査",
        Role::Admin => "申込・出店者・スケジュールの管理",
    }
}

fn portal_role(portal: &str) -> Result<Role, AppError> {
    Role::from_portal(portal).ok_or_else(|| AppError::NotFound("Page not found".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// `/` sends signed-in accounts to their dashboard, everyone else to login.
pub async fn index(OptionalAuth(user): OptionalAuth) -> Redirect {
    if user.is_some() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// `/dashboard` sends the account to its role's dashboard.
pub async fn dashboard(RequireAuth(user): RequireAuth) -> Redirect {
    Redirect::to(user.role.dashboard_path())
}

/// Display the portal chooser.
pub async fn portal_chooser(State(state): State<AppState>) -> impl IntoResponse {
    PortalsTemplate {
        event_name: state.config().event_name.clone(),
        portals: Role::ALL
            .into_iter()
            .map(|role| PortalLink {
                href: format!("/login/{}", role.portal()),
                label: role.label(),
                description: portal_description(role),
            })
            .collect(),
    }
}

/// Display a portal's login page.
///
/// Accounts already signed in with a role this portal accepts go straight
/// to their dashboard.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(portal): Path<String>,
) -> Result<Response, AppError> {
    let role = portal_role(&portal)?;

    if let Some(user) = user.filter(|u| portal_accepts(role, u.role)) {
        return Ok(Redirect::to(user.role.dashboard_path()).into_response());
    }

    Ok(LoginTemplate {
        event_name: state.config().event_name.clone(),
        portal: role.portal(),
        role_label: role.label(),
        email: String::new(),
        error: None,
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Path(portal): Path<String>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let role = portal_role(&portal)?;

    match AuthService::new(state.pool())
        .login_for_portal(role, &form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id.to_string(), current.email.as_str());

            tracing::info!(user_id = %current.id, role = %current.role, "Signed in");
            Ok(Redirect::to(current.role.dashboard_path()).into_response())
        }
        Err(e) => {
            let status = match &e {
                AuthError::WrongPortal => StatusCode::FORBIDDEN,
                AuthError::InvalidEmail(_) | AuthError::InvalidCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                other => {
                    tracing::error!(error = %other, "Login failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            tracing::warn!(error = %e, portal = %portal, "Login refused");

            let page = LoginTemplate {
                event_name: state.config().event_name.clone(),
                portal: role.portal(),
                role_label: role.label(),
                email: form.email,
                error: Some(e.login_message()),
            };
            Ok((status, page).into_response())
        }
    }
}

/// Handle logout.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}
