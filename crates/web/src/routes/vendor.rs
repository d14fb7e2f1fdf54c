//! Vendor dashboard route handlers.
//!
//! Vendors submit typed application forms, follow their review status and,
//! once a form is approved, book the days they will attend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use night_market_core::payload::participation_months;
use night_market_core::{EventId, FormId, FormType};

use super::api::path_id;
use crate::db::{EventRepository, FormRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireVendor;
use crate::models::{CurrentUser, FormSummary};
use crate::services::form_input::payload_from_pairs;
use crate::services::submission::submit_form;
use crate::services::{EventInput, ScheduleError, SubmitError, group_by_month, schedule};
use crate::state::AppState;
use crate::views::{
    FormDetailView, FormRowView, InputSectionView, MonthView, Nav, input_sections, month_views,
    payload_error_message,
};

// =============================================================================
// Templates
// =============================================================================

/// A form type the vendor can apply with.
#[derive(Debug, Clone)]
pub struct FormLink {
    pub href: String,
    pub title: &'static str,
    pub label: &'static str,
}

/// Vendor dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/dashboard.html")]
pub struct VendorDashboardTemplate {
    pub nav: Nav,
    pub form_links: Vec<FormLink>,
    pub forms: Vec<FormRowView>,
    pub submitted: bool,
}

/// Application form template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/apply.html")]
pub struct ApplyTemplate {
    pub nav: Nav,
    pub title: &'static str,
    pub action: String,
    pub sections: Vec<InputSectionView>,
    pub error: Option<String>,
}

/// Application detail and scheduler template.
#[derive(Template, WebTemplate)]
#[template(path = "vendor/form.html")]
pub struct VendorFormTemplate {
    pub nav: Nav,
    pub form: FormDetailView,
    pub shop_name: String,
    pub can_schedule: bool,
    /// Months dates must fall in, e.g. `7月、8月`. Empty allows any.
    pub months_hint: String,
    pub event_count: usize,
    pub schedule: Vec<MonthView>,
    pub event_form: EventForm,
    pub error: Option<String>,
}

// =============================================================================
// Form Types
// =============================================================================

/// Query parameters of the vendor dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub submitted: Option<String>,
}

/// Add-event form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

fn submittable(form_type: &str) -> Result<FormType, AppError> {
    form_type
        .parse::<FormType>()
        .ok()
        .filter(|t| FormType::SUBMITTABLE.contains(t))
        .ok_or_else(|| AppError::NotFound("Page not found".to_string()))
}

fn apply_path(form_type: FormType) -> String {
    format!("/dashboard/user/{}", form_type.as_str())
}

fn form_path(form_id: FormId) -> String {
    format!("/dashboard/user/forms/{form_id}")
}

async fn owned_form(
    state: &AppState,
    user: &CurrentUser,
    id: &str,
) -> Result<FormSummary, AppError> {
    let form_id: FormId = path_id(id, "Form")?;
    let summary = FormRepository::new(state.pool())
        .get_summary(form_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Form not found".to_string()))?;

    if summary.owner_id != user.id {
        tracing::warn!(form_id = %form_id, user_id = %user.id, "Form of another vendor requested");
        return Err(AppError::Forbidden("Forbidden".to_string()));
    }
    Ok(summary)
}

async fn render_form(
    state: &AppState,
    user: &CurrentUser,
    summary: &FormSummary,
    event_form: EventForm,
    error: Option<String>,
) -> Result<VendorFormTemplate, AppError> {
    let events = EventRepository::new(state.pool())
        .list_for_form(summary.form.id)
        .await?;
    let months_hint = participation_months(&summary.form.data)
        .iter()
        .map(|m| format!("{m}月"))
        .collect::<Vec<_>>()
        .join("、");

    Ok(VendorFormTemplate {
        nav: Nav::new(&state.config().event_name, user, &form_path(summary.form.id)),
        form: FormDetailView::from(&summary.form),
        shop_name: summary.shop_name.clone(),
        can_schedule: summary.form.status.allows_events(),
        months_hint,
        event_count: events.len(),
        schedule: month_views(&group_by_month(events)),
        event_form,
        error,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Vendor dashboard handler.
#[instrument(skip(user, state))]
pub async fn dashboard(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let forms = FormRepository::new(state.pool())
        .list_for_user(user.id)
        .await?
        .iter()
        .map(FormRowView::from)
        .collect();

    let form_links = FormType::SUBMITTABLE
        .into_iter()
        .map(|t| FormLink {
            href: apply_path(t),
            title: t.form_title(),
            label: t.label(),
        })
        .collect();

    Ok(VendorDashboardTemplate {
        nav: Nav::new(&state.config().event_name, &user, "/dashboard/user"),
        form_links,
        forms,
        submitted: query.submitted.is_some(),
    })
}

/// Application form handler.
#[instrument(skip(user, state))]
pub async fn application_form(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(form_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let form_type = submittable(&form_type)?;
    let path = apply_path(form_type);
    let prefill = json!({ "email": user.email });

    Ok(ApplyTemplate {
        nav: Nav::new(&state.config().event_name, &user, &path),
        title: form_type.form_title(),
        action: path,
        sections: input_sections(form_type, &prefill),
        error: None,
    })
}

/// Application form submission handler.
///
/// Invalid submissions re-render the form with the entered values.
#[instrument(skip(user, state, pairs))]
pub async fn submit_application(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(form_type): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let form_type = submittable(&form_type)?;
    let data: Value = payload_from_pairs(form_type, pairs);

    match submit_form(state.pool(), &user, &data).await {
        Ok(_) => Ok(Redirect::to("/dashboard/user?submitted=1").into_response()),
        Err(SubmitError::Invalid(e)) => {
            tracing::debug!(error = %e, "Application rejected");
            let path = apply_path(form_type);
            let page = ApplyTemplate {
                nav: Nav::new(&state.config().event_name, &user, &path),
                title: form_type.form_title(),
                action: path,
                sections: input_sections(form_type, &data),
                error: Some(payload_error_message(form_type, &e)),
            };
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Application detail and scheduler handler.
#[instrument(skip(user, state))]
pub async fn form_detail(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let summary = owned_form(&state, &user, &id).await?;
    render_form(&state, &user, &summary, EventForm::default(), None).await
}

/// Add-event handler.
///
/// Rejected dates and times re-render the page with the entered values.
#[instrument(skip(user, state, event_form))]
pub async fn add_event(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(event_form): Form<EventForm>,
) -> Result<Response, AppError> {
    let summary = owned_form(&state, &user, &id).await?;

    let created = match EventInput::parse(
        Some(&event_form.date),
        Some(&event_form.start_time),
        Some(&event_form.end_time),
    ) {
        Ok(input) => schedule::create_event(state.pool(), &user, summary.form.id, input).await,
        Err(e) => Err(e),
    };

    match created {
        Ok(_) => Ok(Redirect::to(&format!("{}#schedule", form_path(summary.form.id))).into_response()),
        Err(e @ (ScheduleError::NotOwner | ScheduleError::EventNotFound | ScheduleError::Repository(_))) => {
            Err(e.into())
        }
        Err(e) => {
            let message = e.user_message();
            let page = render_form(&state, &user, &summary, event_form, Some(message)).await?;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}

/// Delete-event handler.
#[instrument(skip(user, state))]
pub async fn delete_event(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path((id, event_id)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let form_id: FormId = path_id(&id, "Form")?;
    let event_id: EventId = path_id(&event_id, "Event")?;

    schedule::delete_event(state.pool(), &user, event_id).await?;
    Ok(Redirect::to(&format!("{}#schedule", form_path(form_id))))
}
