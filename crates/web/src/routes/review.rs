//! Application detail and status pages shared by the staff and admin dashboards.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use night_market_core::{FormId, FormStatus};

use super::api::path_id;
use crate::db::{EventRepository, FormRepository};
use crate::error::AppError;
use crate::filters;
use crate::models::{CurrentUser, FormSummary};
use crate::services::{group_by_month, review};
use crate::state::AppState;
use crate::views::{FormDetailView, MonthView, Nav, StatusOption, month_views, status_options};

/// The dashboard a review page is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desk {
    Staff,
    Admin,
}

impl Desk {
    /// Path of the application list; details live below it.
    #[must_use]
    pub const fn list_path(self) -> &'static str {
        match self {
            Self::Staff => "/dashboard/staff/submissions",
            Self::Admin => "/dashboard/admin/applications",
        }
    }

    #[must_use]
    pub const fn list_label(self) -> &'static str {
        match self {
            Self::Staff => "申込一覧",
            Self::Admin => "申込管理",
        }
    }

    fn detail_path(self, form_id: FormId) -> String {
        format!("{}/{form_id}", self.list_path())
    }
}

/// Status change form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub admin_notes: String,
}

/// Query parameters of the detail page.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub updated: Option<String>,
}

/// Application detail template.
#[derive(Template, WebTemplate)]
#[template(path = "review/detail.html")]
pub struct ReviewDetailTemplate {
    pub nav: Nav,
    pub list_path: &'static str,
    pub list_label: &'static str,
    pub action_path: String,
    pub form: FormDetailView,
    pub shop_name: String,
    pub owner_name: String,
    pub owner_email: String,
    pub statuses: Vec<StatusOption>,
    pub admin_notes: String,
    pub schedule: Vec<MonthView>,
    pub notice: Option<&'static str>,
    pub error: Option<&'static str>,
}

async fn load(state: &AppState, id: &str) -> Result<FormSummary, AppError> {
    let form_id: FormId = path_id(id, "Form")?;
    FormRepository::new(state.pool())
        .get_summary(form_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))
}

async fn render(
    state: &AppState,
    user: &CurrentUser,
    desk: Desk,
    summary: &FormSummary,
    admin_notes: String,
    notice: Option<&'static str>,
    error: Option<&'static str>,
) -> Result<ReviewDetailTemplate, AppError> {
    let events = EventRepository::new(state.pool())
        .list_for_form(summary.form.id)
        .await?;
    let current_path = desk.detail_path(summary.form.id);

    Ok(ReviewDetailTemplate {
        nav: Nav::new(&state.config().event_name, user, &current_path),
        list_path: desk.list_path(),
        list_label: desk.list_label(),
        action_path: format!("{current_path}/status"),
        form: FormDetailView::from(&summary.form),
        shop_name: summary.shop_name.clone(),
        owner_name: summary.owner_display().to_owned(),
        owner_email: summary.owner_email.to_string(),
        statuses: status_options(Some(summary.form.status)),
        admin_notes,
        schedule: month_views(&group_by_month(events)),
        notice,
        error,
    })
}

/// Render the detail page of application `id`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if there is no such form.
pub async fn detail_page(
    state: &AppState,
    user: &CurrentUser,
    desk: Desk,
    id: &str,
    query: DetailQuery,
) -> Result<Response, AppError> {
    let summary = load(state, id).await?;
    let notice = query.updated.is_some().then_some("ステータスを更新しました");
    let notes = summary.form.admin_notes.clone().unwrap_or_default();

    Ok(render(state, user, desk, &summary, notes, notice, None)
        .await?
        .into_response())
}

/// Apply a status change posted from the detail page.
///
/// Blank notes clear the stored notes. Posting the current status and notes
/// again changes nothing and says so.
///
/// # Errors
///
/// Returns `AppError::NotFound` if there is no such form.
pub async fn apply_status(
    state: &AppState,
    user: &CurrentUser,
    desk: Desk,
    id: &str,
    form: StatusForm,
) -> Result<Response, AppError> {
    let summary = load(state, id).await?;
    let notes = Some(form.admin_notes.trim().to_owned()).filter(|n| !n.is_empty());

    let Ok(status) = form.status.parse::<FormStatus>() else {
        let page = render(
            state,
            user,
            desk,
            &summary,
            form.admin_notes,
            None,
            Some("ステータスが正しくありません"),
        )
        .await?;
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    };

    if status == summary.form.status && notes == summary.form.admin_notes {
        let page = render(
            state,
            user,
            desk,
            &summary,
            form.admin_notes,
            Some("変更がありません"),
            None,
        )
        .await?;
        return Ok(page.into_response());
    }

    review::update_status(
        state.pool(),
        user,
        summary.form.id,
        status,
        Some(notes.as_deref()),
    )
    .await?;

    Ok(Redirect::to(&format!("{}?updated=1", desk.detail_path(summary.form.id))).into_response())
}
