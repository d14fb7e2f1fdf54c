//! Admin dashboard route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use night_market_core::{BulkAction, FormId, FormStatus, FormType, Role};

use super::review::{self, DetailQuery, Desk, StatusForm};
use crate::db::{ApplicationFilter, EventRepository, FormRepository, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::services::{ReviewError, group_by_month, review as review_service};
use crate::state::AppState;
use crate::views::{
    FormRowView, MonthView, Nav, StatusOption, UserRowView, VendorRowView, month_views,
    status_options,
};

/// Applications shown on the dashboard.
const RECENT_LIMIT: usize = 5;

// =============================================================================
// Templates
// =============================================================================

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub nav: Nav,
    pub total_applications: i64,
    pub pending: i64,
    pub vendor_count: i64,
    pub staff_count: i64,
    /// Most recent applications.
    pub forms: Vec<FormRowView>,
}

/// A form type choice in the applications filter.
#[derive(Debug, Clone)]
pub struct TypeOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Applications list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/applications.html")]
pub struct ApplicationsTemplate {
    pub nav: Nav,
    pub search: String,
    pub statuses: Vec<StatusOption>,
    pub types: Vec<TypeOption>,
    pub date_from: String,
    pub date_to: String,
    pub forms: Vec<FormRowView>,
    pub notice: Option<String>,
    pub error: Option<&'static str>,
}

/// Vendor list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/vendors.html")]
pub struct AdminVendorsTemplate {
    pub nav: Nav,
    pub vendors: Vec<VendorRowView>,
}

/// Event schedule template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/events.html")]
pub struct AdminEventsTemplate {
    pub nav: Nav,
    pub total: usize,
    pub months: Vec<MonthView>,
}

/// One status line of the report.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub label: &'static str,
    pub badge_class: &'static str,
    pub count: i64,
    /// Share of all applications, e.g. `42.9%`.
    pub share: String,
}

/// Reports template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reports.html")]
pub struct ReportsTemplate {
    pub nav: Nav,
    pub total: i64,
    pub vendor_count: i64,
    pub rows: Vec<ReportRow>,
}

/// Account list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/security.html")]
pub struct SecurityTemplate {
    pub nav: Nav,
    pub users: Vec<UserRowView>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the applications list.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationsQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub form_type: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Status set by the last bulk update.
    pub bulk: Option<String>,
    pub count: Option<u64>,
    pub bulk_error: Option<String>,
}

impl ApplicationsQuery {
    /// Repository filter. Unreadable values are ignored.
    fn filter(&self) -> ApplicationFilter {
        ApplicationFilter {
            search: self.q.clone().filter(|s| !s.trim().is_empty()),
            status: self.status.as_deref().and_then(|s| s.parse().ok()),
            form_type: self.form_type.as_deref().and_then(|s| s.parse().ok()),
            date_from: self.from.as_deref().and_then(parse_day),
            date_to: self.to.as_deref().and_then(parse_day),
        }
    }

    fn notice(&self) -> Option<String> {
        let status: FormStatus = self.bulk.as_deref()?.parse().ok()?;
        Some(format!(
            "{}件の申込を「{}」にしました",
            self.count.unwrap_or_default(),
            status.label()
        ))
    }

    fn error(&self) -> Option<&'static str> {
        match self.bulk_error.as_deref()? {
            "empty" => Some("申込を選択してください"),
            _ => Some("一括操作を選択してください"),
        }
    }
}

fn parse_day(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn type_options(selected: Option<FormType>) -> Vec<TypeOption> {
    FormType::ALL
        .into_iter()
        .map(|t| TypeOption {
            value: t.as_str(),
            label: t.label(),
            selected: Some(t) == selected,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)] // counts stay far below 2^52
fn share(count: i64, total: i64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

// =============================================================================
// Handlers
// =============================================================================

/// Admin dashboard handler.
#[instrument(skip(admin, state))]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let forms = FormRepository::new(state.pool());
    let users = UserRepository::new(state.pool());

    let counts = forms.status_counts().await?;
    let vendor_count = users.count_by_role(Role::User).await?;
    let staff_count = users.count_by_role(Role::Staff).await?;
    let forms = forms
        .list_with_owner(&ApplicationFilter::default())
        .await?
        .iter()
        .take(RECENT_LIMIT)
        .map(FormRowView::from)
        .collect();

    Ok(AdminDashboardTemplate {
        nav: Nav::new(&state.config().event_name, &admin, "/dashboard/admin"),
        total_applications: counts.total(),
        pending: counts.pending,
        vendor_count,
        staff_count,
        forms,
    })
}

/// Applications list handler.
#[instrument(skip(admin, state))]
pub async fn applications(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ApplicationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.filter();
    let forms = FormRepository::new(state.pool())
        .list_with_owner(&filter)
        .await?
        .iter()
        .map(FormRowView::from)
        .collect();

    Ok(ApplicationsTemplate {
        nav: Nav::new(&state.config().event_name, &admin, "/dashboard/admin/applications"),
        search: filter.search.clone().unwrap_or_default(),
        statuses: status_options(filter.status),
        types: type_options(filter.form_type),
        date_from: filter.date_from.map(|d| d.to_string()).unwrap_or_default(),
        date_to: filter.date_to.map(|d| d.to_string()).unwrap_or_default(),
        forms,
        notice: query.notice(),
        error: query.error(),
    })
}

/// Bulk approve/reject handler for the checkbox selection.
#[instrument(skip(admin, state, pairs))]
pub async fn bulk_update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    const LIST: &str = "/dashboard/admin/applications";

    let Some(action) = pairs
        .iter()
        .find(|(k, _)| k == "action")
        .and_then(|(_, v)| v.parse::<BulkAction>().ok())
    else {
        return Ok(Redirect::to(&format!("{LIST}?bulk_error=action")));
    };

    let raw_ids: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == "ids")
        .map(|(_, v)| v.as_str())
        .collect();
    if raw_ids.is_empty() {
        return Ok(Redirect::to(&format!("{LIST}?bulk_error=empty")));
    }
    let ids: Vec<FormId> = raw_ids.iter().filter_map(|s| s.parse().ok()).collect();

    let (count, status) = match review_service::bulk_update(state.pool(), &admin, &ids, action).await {
        Ok(result) => result,
        Err(ReviewError::EmptySelection) => (0, action.target_status()),
        Err(e) => return Err(e.into()),
    };

    Ok(Redirect::to(&format!("{LIST}?bulk={status}&count={count}")))
}

/// Application detail handler.
#[instrument(skip(admin, state))]
pub async fn application_detail(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    review::detail_page(&state, &admin, Desk::Admin, &id, query).await
}

/// Application status change handler.
#[instrument(skip(admin, state, form))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    review::apply_status(&state, &admin, Desk::Admin, &id, form).await
}

/// Vendor list handler.
#[instrument(skip(admin, state))]
pub async fn vendors(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let vendors = UserRepository::new(state.pool())
        .list_vendors()
        .await?
        .iter()
        .map(VendorRowView::from)
        .collect();

    Ok(AdminVendorsTemplate {
        nav: Nav::new(&state.config().event_name, &admin, "/dashboard/admin/vendors"),
        vendors,
    })
}

/// Scheduled events of all approved applications, by month.
#[instrument(skip(admin, state))]
pub async fn events(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let scheduled = EventRepository::new(state.pool()).list_scheduled().await?;
    let total = scheduled.len();
    let months = month_views(&group_by_month(scheduled));

    Ok(AdminEventsTemplate {
        nav: Nav::new(&state.config().event_name, &admin, "/dashboard/admin/events"),
        total,
        months,
    })
}

/// Application counts per status.
#[instrument(skip(admin, state))]
pub async fn reports(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let counts = FormRepository::new(state.pool()).status_counts().await?;
    let vendor_count = UserRepository::new(state.pool())
        .count_by_role(Role::User)
        .await?;
    let total = counts.total();

    let rows = FormStatus::ALL
        .into_iter()
        .map(|status| ReportRow {
            label: status.label(),
            badge_class: status.badge_class(),
            count: counts.get(status),
            share: share(counts.get(status), total),
        })
        .collect();

    Ok(ReportsTemplate {
        nav: Nav::new(&state.config().event_name, &admin, "/dashboard/admin/reports"),
        total,
        vendor_count,
        rows,
    })
}

/// All accounts with their roles.
#[instrument(skip(admin, state))]
pub async fn security(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let users = UserRepository::new(state.pool())
        .list_all()
        .await?
        .iter()
        .map(UserRowView::from)
        .collect();

    Ok(SecurityTemplate {
        nav: Nav::new(&state.config().event_name, &admin, "/dashboard/admin/security"),
        users,
    })
}
