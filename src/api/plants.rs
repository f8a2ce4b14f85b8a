//! Plant CRUD and dashboard handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{blocking, get_user_id};
use crate::db::{self, Plant};
use crate::error::SprigError;
use crate::status::{derive_status, PlantStatus, StatusInput};
use crate::AppState;

/// A plant as the read paths return it: stored fields plus the derived
/// care status.
#[derive(Serialize)]
pub(super) struct PlantView {
    #[serde(flatten)]
    plant: Plant,
    derived_status: PlantStatus,
}

fn view(plant: Plant, now: i64) -> PlantView {
    let derived_status = derive_status(&StatusInput::from_plant(&plant, now));
    PlantView { plant, derived_status }
}

pub(super) async fn create_plant(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(input): Json<db::PlantInput>,
) -> Result<(StatusCode, Json<Plant>), SprigError> {
    let user_id = get_user_id(&headers)?;
    let db = state.db.clone();
    let plant = blocking(move || db.insert_plant(&user_id, input)).await??;
    Ok((StatusCode::CREATED, Json(plant)))
}

pub(super) async fn list_plants(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<Vec<PlantView>>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let db = state.db.clone();
    let plants = blocking(move || db.list_plants(&user_id)).await??;
    let now = db::now_ms();
    Ok(Json(plants.into_iter().map(|p| view(p, now)).collect()))
}

pub(super) async fn get_plant(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PlantView>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let db = state.db.clone();
    let plant = blocking(move || db.get_plant_owned(&id, &user_id))
        .await??
        .ok_or(SprigError::NotFound)?;
    Ok(Json(view(plant, db::now_ms())))
}

pub(super) async fn delete_plant(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let db = state.db.clone();
    let deleted = blocking(move || db.delete_plant(&id, &user_id)).await??;
    if !deleted {
        return Err(SprigError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Per-owner aggregation. The needs_water / needs_fertilizer sets are built
/// by running the same derivation as the single-plant view over every plant,
/// so the two can never disagree.
pub(super) async fn dashboard(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<serde_json::Value>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let db = state.db.clone();
    let uid = user_id.clone();
    let (plants, reminders) = blocking(
        move || -> Result<(Vec<Plant>, Vec<db::Reminder>), SprigError> {
            Ok((db.list_plants(&uid)?, db.list_reminders(&uid)?))
        },
    )
    .await??;

    let now = db::now_ms();
    let mut needs_water = Vec::new();
    let mut needs_fertilizer = Vec::new();
    for p in &plants {
        match derive_status(&StatusInput::from_plant(p, now)) {
            PlantStatus::NeedsWater => needs_water.push(p.id.clone()),
            PlantStatus::NeedsFertilizer => needs_fertilizer.push(p.id.clone()),
            _ => {}
        }
    }

    let due_reminders: Vec<_> = reminders
        .iter()
        .filter(|r| r.status == db::ReminderStatus::Pending && r.due_date <= now)
        .cloned()
        .collect();

    let plant_views: Vec<PlantView> = plants.into_iter().map(|p| view(p, now)).collect();
    Ok(Json(serde_json::json!({
        "plants": plant_views,
        "needs_water": needs_water,
        "needs_fertilizer": needs_fertilizer,
        "due_reminders": due_reminders,
    })))
}
