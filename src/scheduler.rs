//! Reminder scheduling.
//!
//! Runs synchronously inside care-log ingestion: computes the next due date
//! for the care type, upserts the (plant, care_type) reminder, and stamps the
//! plant's last/next care dates.

use tracing::debug;

use crate::db::{CareType, Plant, PlantDB, Reminder, DAY_MS};
use crate::error::SprigError;

/// Advance the care schedule after a care event at `now`.
///
/// A configured frequency of zero or less disables scheduling for that care
/// type entirely: no reminder is touched and the plant keeps its timestamps.
/// Returns the reminder now on file, or None when scheduling is disabled.
pub fn advance(
    db: &PlantDB,
    plant: &Plant,
    care_type: CareType,
    now: i64,
) -> Result<Option<Reminder>, SprigError> {
    let frequency = match plant.frequency_for(care_type) {
        Some(f) if f > 0 => f,
        _ => {
            debug!(plant = %plant.id, care_type = care_type.as_str(), "scheduling disabled");
            return Ok(None);
        }
    };

    // Frequencies are bounded at insert, but rows predating the bound (or
    // written directly) must not panic the ingestion path.
    let due_date = frequency
        .checked_mul(DAY_MS)
        .and_then(|span| now.checked_add(span))
        .ok_or_else(|| {
            SprigError::Validation(format!("care frequency {frequency} days out of range"))
        })?;
    let reminder = db.upsert_reminder(plant, care_type, due_date)?;
    db.touch_care_dates(&plant.id, care_type, now, due_date)?;

    debug!(
        plant = %plant.id,
        care_type = care_type.as_str(),
        due_date,
        "care schedule advanced"
    );
    Ok(Some(reminder))
}
