//! Reminder operations.
//!
//! The reminders table carries UNIQUE(plant_id, care_type) and all writes go
//! through an atomic upsert, so concurrent care-log submissions for the same
//! plant and care type can never leave two reminder rows behind.

use rusqlite::params;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use super::*;

const REMINDER_COLS: &str = "id, plant_id, user_id, care_type, title, due_date, status, created_at";

fn row_to_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reminder> {
    let care_type: String = row.get(3)?;
    let status: String = row.get(6)?;
    Ok(Reminder {
        id: row.get(0)?,
        plant_id: row.get(1)?,
        user_id: row.get(2)?,
        care_type: CareType::parse(&care_type).unwrap_or(CareType::Other),
        title: row.get(4)?,
        due_date: row.get(5)?,
        status: ReminderStatus::parse(&status).unwrap_or(ReminderStatus::Pending),
        created_at: row.get(7)?,
    })
}

impl PlantDB {
    /// Create or refresh the reminder for (plant, care_type): a fresh row gets
    /// the templated title; an existing one gets the new due date and its
    /// status reset to pending.
    pub fn upsert_reminder(
        &self,
        plant: &Plant,
        care_type: CareType,
        due_date: i64,
    ) -> Result<Reminder, SprigError> {
        let title = format!("{} {}", care_type.verb(), plant.name);
        let id = Uuid::new_v4().to_string();
        let now = now_ms();
        self.conn()?.execute(
            "INSERT INTO reminders (id, plant_id, user_id, care_type, title, due_date, status, created_at) \
             VALUES (?1,?2,?3,?4,?5,?6,'pending',?7) \
             ON CONFLICT(plant_id, care_type) DO UPDATE SET \
               due_date = excluded.due_date, status = 'pending'",
            params![id, plant.id, plant.user_id, care_type.as_str(), title, due_date, now],
        )?;
        self.reminder_for(&plant.id, care_type)?
            .ok_or(SprigError::Internal("reminder upsert lost its row".into()))
    }

    pub fn reminder_for(
        &self,
        plant_id: &str,
        care_type: CareType,
    ) -> Result<Option<Reminder>, SprigError> {
        Ok(self
            .conn()?
            .query_row(
                &format!(
                    "SELECT {REMINDER_COLS} FROM reminders \
                     WHERE plant_id = ?1 AND care_type = ?2"
                ),
                params![plant_id, care_type.as_str()],
                row_to_reminder,
            )
            .optional()?)
    }

    pub fn list_reminders(&self, user_id: &str) -> Result<Vec<Reminder>, SprigError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {REMINDER_COLS} FROM reminders WHERE user_id = ?1 ORDER BY due_date"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_reminder)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Completion/dismissal comes from outside the care pipeline.
    pub fn set_reminder_status(
        &self,
        id: &str,
        user_id: &str,
        status: ReminderStatus,
    ) -> Result<Option<Reminder>, SprigError> {
        let n = self.conn()?.execute(
            "UPDATE reminders SET status = ?3 WHERE id = ?1 AND user_id = ?2",
            params![id, user_id, status.as_str()],
        )?;
        if n == 0 {
            return Ok(None);
        }
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {REMINDER_COLS} FROM reminders WHERE id = ?1"),
                params![id],
                row_to_reminder,
            )
            .optional()?)
    }
}
