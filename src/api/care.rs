//! Care-log ingestion and read handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{blocking, get_user_id};
use crate::db::{CareLog, CareType, JournalEntry};
use crate::enrich::{self, EnrichmentJob};
use crate::error::SprigError;
use crate::photo;
use crate::AppState;

#[derive(Deserialize)]
pub(super) struct CareLogInput {
    /// water | fertilize | other
    care_type: String,
    notes: Option<String>,
    /// Base64 image payload, bare or as a data URL.
    photo: Option<String>,
}

/// POST /plants/{id}/care — the ingestion path.
///
/// Everything up to the response is synchronous: ownership check, photo
/// decode, care-log insert, schedule advance. Enrichment is dispatched after
/// all of that as a detached task and can never affect this response.
pub(super) async fn create_care_log(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(plant_id): Path<String>,
    Json(input): Json<CareLogInput>,
) -> Result<(StatusCode, Json<CareLog>), SprigError> {
    let user_id = get_user_id(&headers)?;
    let care_type = CareType::parse(&input.care_type)?;

    let db = state.db.clone();
    let pid = plant_id.clone();
    let plant = blocking(move || db.get_plant_owned(&pid, &user_id))
        .await??
        .ok_or(SprigError::NotFound)?;

    // Photo first: a decode failure must abort before anything is persisted.
    let stored_photo = match input.photo {
        Some(payload) => {
            let dir = state.photo_dir.clone();
            Some(blocking(move || photo::store_photo(&payload, &dir)).await??)
        }
        None => None,
    };

    let db = state.db.clone();
    let plant2 = plant.clone();
    let notes = input.notes;
    let photo_path = stored_photo.as_ref().map(|p| p.path.clone());
    let care_log = blocking(move || -> Result<CareLog, SprigError> {
        let log = db.create_care_log(&plant2.id, care_type, notes, photo_path)?;
        crate::scheduler::advance(&db, &plant2, care_type, log.created_at)?;
        Ok(log)
    })
    .await??;

    if let Some(photo) = stored_photo {
        if let Some(ref cfg) = state.ai {
            enrich::spawn_enrichment(
                state.db.clone(),
                cfg.clone(),
                EnrichmentJob { care_log: care_log.clone(), photo_url: photo.data_url },
            );
        }
    }

    Ok((StatusCode::CREATED, Json(care_log)))
}

#[derive(Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<i64>,
}

pub(super) async fn list_care_logs(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(plant_id): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<CareLog>>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let db = state.db.clone();
    let logs = blocking(move || -> Result<Vec<CareLog>, SprigError> {
        db.get_plant_owned(&plant_id, &user_id)?
            .ok_or(SprigError::NotFound)?;
        db.get_care_logs(&plant_id, limit)
    })
    .await??;
    Ok(Json(logs))
}

pub(super) async fn list_journal(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Path(plant_id): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<JournalEntry>>, SprigError> {
    let user_id = get_user_id(&headers)?;
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let db = state.db.clone();
    let entries = blocking(move || -> Result<Vec<JournalEntry>, SprigError> {
        db.get_plant_owned(&plant_id, &user_id)?
            .ok_or(SprigError::NotFound)?;
        db.get_journal_entries(&plant_id, limit)
    })
    .await??;
    Ok(Json(entries))
}
