//! Reminder read/update handlers. Creation happens only through the
//! scheduler; these endpoints cover listing and external completion or
//! dismissal.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::{blocking, get_user_id};
use crate::db::{Reminder, ReminderStatus};
use crate::error::SprigError;
use crate::AppState;

pub(super) async fn list_reminders(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<Vec<Reminder>>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let db = state.db.clone();
    let reminders = blocking(move || db.list_reminders(&user_id)).await??;
    Ok(Json(reminders))
}

#[derive(Deserialize)]
pub(super) struct ReminderUpdate {
    /// pending | completed | dismissed
    status: String,
}

pub(super) async fn update_reminder(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ReminderUpdate>,
) -> Result<Json<Reminder>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let status = ReminderStatus::parse(&body.status)?;
    let db = state.db.clone();
    let reminder = blocking(move || db.set_reminder_status(&id, &user_id, status))
        .await??
        .ok_or(SprigError::NotFound)?;
    Ok(Json(reminder))
}
