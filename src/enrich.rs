//! Background enrichment of photo-carrying care logs.
//!
//! Runs entirely after the ingestion response has been sent. Three steps in
//! order: light classification, journal generation, identity-mismatch
//! annotation. A failure in any step logs a warning and stops the rest; the
//! already-committed care log is never rolled back, and nothing is retried —
//! repeated vision/LLM calls are costly and a missed enrichment is not worth
//! paying for twice.

use tracing::{debug, info, warn};

use crate::ai::{self, AiConfig, LightReading};
use crate::db::{CareLog, CareLogMetadata, Confidence, IdentityMismatch};
use crate::error::SprigError;
use crate::SharedDB;

/// Everything the pipeline needs, captured at ingestion time so the request
/// can return without waiting.
pub struct EnrichmentJob {
    pub care_log: CareLog,
    pub photo_url: String,
}

/// Dispatch the pipeline as a detached task. There is no handle, no
/// cancellation, and no result channel; outcomes surface only in logs and in
/// later reads.
pub fn spawn_enrichment(db: SharedDB, cfg: AiConfig, job: EnrichmentJob) {
    tokio::spawn(async move {
        let log_id = job.care_log.id.clone();
        if let Err(e) = run_enrichment(&db, &cfg, job).await {
            warn!(care_log = %log_id, error = %e, "enrichment pipeline aborted");
        }
    });
}

/// The pipeline body. Exposed for tests; production entry is
/// [`spawn_enrichment`].
pub async fn run_enrichment(
    db: &SharedDB,
    cfg: &AiConfig,
    job: EnrichmentJob,
) -> Result<(), SprigError> {
    let plant_id = job.care_log.plant_id.clone();

    // 1. light classification
    let reading = ai::classify_light(cfg, &job.photo_url).await?;
    apply_light_reading(db, &plant_id, reading).await?;

    // 2. journal generation — needs the plant's current state; a plant
    // deleted mid-flight ends the pipeline quietly.
    let db2 = db.clone();
    let pid = plant_id.clone();
    let Some(with_care) = crate::db_call(&db2, move |d| d.get_plant_with_care(&pid)).await??
    else {
        debug!(plant = %plant_id, "plant gone before journal generation, skipping");
        return Ok(());
    };

    let outcome = ai::generate_journal(cfg, &job.care_log, &with_care, Some(&job.photo_url)).await?;

    let narrative = outcome.narrative.trim().to_string();
    if !narrative.is_empty() {
        let db2 = db.clone();
        let pid = plant_id.clone();
        let log_id = job.care_log.id.clone();
        let entry = crate::db_call(&db2, move |d| {
            d.create_journal_entry(&pid, &log_id, &narrative)
        })
        .await??;
        if entry.is_none() {
            debug!(plant = %plant_id, "plant gone before journal write, skipping");
            return Ok(());
        }
    }

    // 3. identity-mismatch annotation — absence of a verdict, or a match,
    // is a no-op.
    if let Some(verdict) = outcome.identity_match {
        if !verdict.matches {
            let meta = CareLogMetadata {
                identity_mismatch: Some(IdentityMismatch {
                    detected_plant: verdict.detected_plant.clone(),
                    flagged_at: crate::db::now_ms(),
                }),
            };
            let db2 = db.clone();
            let log_id = job.care_log.id.clone();
            let patched =
                crate::db_call(&db2, move |d| d.patch_metadata(&log_id, &meta)).await??;
            if patched {
                info!(
                    care_log = %job.care_log.id,
                    detected = verdict.detected_plant.as_deref().unwrap_or("unknown"),
                    "identity mismatch flagged"
                );
            }
        }
    }

    Ok(())
}

/// Apply a light classification to the plant, gated on confidence: a "low"
/// tier never mutates anything — one noisy photo must not overwrite the
/// sunlight level. A plant deleted while the call was in flight is a quiet
/// no-op.
pub async fn apply_light_reading(
    db: &SharedDB,
    plant_id: &str,
    reading: LightReading,
) -> Result<(), SprigError> {
    if reading.confidence == Confidence::Low {
        debug!(
            plant = %plant_id,
            level = reading.sunlight_level.as_str(),
            "light classification confidence too low, ignoring"
        );
        return Ok(());
    }

    let db2 = db.clone();
    let pid = plant_id.to_string();
    let updated =
        crate::db_call(&db2, move |d| d.set_sunlight(&pid, reading.sunlight_level)).await??;
    if updated {
        info!(plant = %plant_id, level = reading.sunlight_level.as_str(), "sunlight level updated");
    } else {
        debug!(plant = %plant_id, "plant gone before sunlight update, skipping");
    }
    Ok(())
}
