//! Staff dashboard route handlers.
//!
//! Staff review applications one at a time. Admins can open these pages too.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use night_market_core::FormStatus;

use super::review::{self, DetailQuery, Desk, StatusForm};
use crate::db::{ApplicationFilter, FormRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireStaff;
use crate::state::AppState;
use crate::views::{FormRowView, Nav, StatusOption, VendorRowView, status_options};

/// Applications shown on the dashboard.
const RECENT_LIMIT: usize = 5;

/// Staff dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "staff/dashboard.html")]
pub struct StaffDashboardTemplate {
    pub nav: Nav,
    pub total: i64,
    pub pending: i64,
    pub reviewing: i64,
    /// Most recent applications.
    pub forms: Vec<FormRowView>,
}

/// Submissions list template.
#[derive(Template, WebTemplate)]
#[template(path = "staff/submissions.html")]
pub struct SubmissionsTemplate {
    pub nav: Nav,
    pub search: String,
    pub statuses: Vec<StatusOption>,
    pub forms: Vec<FormRowView>,
}

/// Vendor list template.
#[derive(Template, WebTemplate)]
#[template(path = "staff/vendors.html")]
pub struct StaffVendorsTemplate {
    pub nav: Nav,
    pub vendors: Vec<VendorRowView>,
}

/// Query parameters of the submissions list.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

/// Staff dashboard handler.
#[instrument(skip(user, state))]
pub async fn dashboard(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let repo = FormRepository::new(state.pool());
    let counts = repo.status_counts().await?;
    let forms = repo
        .list_with_owner(&ApplicationFilter::default())
        .await?
        .iter()
        .take(RECENT_LIMIT)
        .map(FormRowView::from)
        .collect();

    Ok(StaffDashboardTemplate {
        nav: Nav::new(&state.config().event_name, &user, "/dashboard/staff"),
        total: counts.total(),
        pending: counts.pending,
        reviewing: counts.reviewing,
        forms,
    })
}

/// Submissions list handler.
#[instrument(skip(user, state))]
pub async fn submissions(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(query): Query<SubmissionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status.as_deref().and_then(|s| s.parse::<FormStatus>().ok());
    let filter = ApplicationFilter {
        search: query.q.clone(),
        status,
        ..ApplicationFilter::default()
    };
    let forms = FormRepository::new(state.pool())
        .list_with_owner(&filter)
        .await?
        .iter()
        .map(FormRowView::from)
        .collect();

    Ok(SubmissionsTemplate {
        nav: Nav::new(&state.config().event_name, &user, "/dashboard/staff/submissions"),
        search: query.q.unwrap_or_default(),
        statuses: status_options(status),
        forms,
    })
}

/// Submission detail handler.
#[instrument(skip(user, state))]
pub async fn submission_detail(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    review::detail_page(&state, &user, Desk::Staff, &id, query).await
}

/// Submission status change handler.
#[instrument(skip(user, state, form))]
pub async fn update_status(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    review::apply_status(&state, &user, Desk::Staff, &id, form).await
}

/// Vendor list handler.
#[instrument(skip(user, state))]
pub async fn vendors(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let vendors = UserRepository::new(state.pool())
        .list_vendors()
        .await?
        .iter()
        .map(VendorRowView::from)
        .collect();

    Ok(StaffVendorsTemplate {
        nav: Nav::new(&state.config().event_name, &user, "/dashboard/staff/vendors"),
        vendors,
    })
}
