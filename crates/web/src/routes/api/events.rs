//! Event (attendance day) API for vendors.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use night_market_core::{EventId, FormId};

use super::{ApiJson, path_id};
use crate::error::ApiError;
use crate::middleware::RequireVendor;
use crate::models::Event;
use crate::services::schedule;
use crate::services::{EventChanges, EventInput, ScheduleError};
use crate::state::AppState;

/// Body of `POST /api/events`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    pub form_id: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Body of `PATCH /api/events/{id}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventBody {
    /// Absent or blank keeps the current date.
    pub date: Option<String>,
    /// Absent keeps the time; `null` or blank clears it.
    #[serde(default, deserialize_with = "super::present")]
    pub start_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::present")]
    pub end_time: Option<Option<String>>,
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// `POST /api/events`
#[instrument(skip(user, state, body), fields(user_id = %user.id))]
pub async fn create(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateEventBody>,
) -> Result<Json<Event>, ApiError> {
    let raw_form_id = blank_to_none(body.form_id.as_deref()).ok_or(ScheduleError::MissingFields)?;
    let input = EventInput::parse(
        body.date.as_deref(),
        body.start_time.as_deref(),
        body.end_time.as_deref(),
    )?;
    // An ID that names no form is treated like someone else's form.
    let form_id: FormId = raw_form_id.parse().map_err(|_| ScheduleError::NotOwner)?;

    let event = schedule::create_event(state.pool(), &user, form_id, input).await?;
    Ok(Json(event))
}

/// `PATCH /api/events/{id}`
#[instrument(skip(user, state, body), fields(user_id = %user.id))]
pub async fn update(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateEventBody>,
) -> Result<Json<Event>, ApiError> {
    let event_id: EventId = path_id(&id, "Event")?;
    let changes = EventChanges::parse(
        body.date.as_deref(),
        body.start_time.as_ref().map(Option::as_deref),
        body.end_time.as_ref().map(Option::as_deref),
    )?;

    let event = schedule::update_event(state.pool(), &user, event_id, changes).await?;
    Ok(Json(event))
}

/// `DELETE /api/events/{id}`
#[instrument(skip(user, state), fields(user_id = %user.id))]
pub async fn delete(
    RequireVendor(user): RequireVendor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event_id: EventId = path_id(&id, "Event")?;
    schedule::delete_event(state.pool(), &user, event_id).await?;
    Ok(Json(json!({ "success": true })))
}
