//! Care log and journal entry operations.

use rusqlite::params;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use super::*;

const CARE_COLS: &str = "id, plant_id, care_type, notes, photo_path, metadata, created_at";

fn row_to_care_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<CareLog> {
    let care_type: String = row.get(2)?;
    Ok(CareLog {
        id: row.get(0)?,
        plant_id: row.get(1)?,
        care_type: CareType::parse(&care_type).unwrap_or(CareType::Other),
        notes: row.get(3)?,
        photo_path: row.get(4)?,
        metadata: opt_metadata(row.get(5)?),
        created_at: row.get(6)?,
    })
}

impl PlantDB {
    pub fn create_care_log(
        &self,
        plant_id: &str,
        care_type: CareType,
        notes: Option<String>,
        photo_path: Option<String>,
    ) -> Result<CareLog, SprigError> {
        if let Some(ref n) = notes {
            if n.chars().count() > MAX_NOTES_LEN {
                return Err(SprigError::Validation("notes too long".into()));
            }
        }

        let now = now_ms();
        let id = Uuid::new_v4().to_string();
        self.conn()?.execute(
            "INSERT INTO care_logs (id, plant_id, care_type, notes, photo_path, created_at) \
             VALUES (?1,?2,?3,?4,?5,?6)",
            params![id, plant_id, care_type.as_str(), notes, photo_path, now],
        )?;

        Ok(CareLog {
            id,
            plant_id: plant_id.to_string(),
            care_type,
            notes,
            photo_path,
            metadata: None,
            created_at: now,
        })
    }

    pub fn get_care_log(&self, id: &str) -> Result<Option<CareLog>, SprigError> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {CARE_COLS} FROM care_logs WHERE id = ?1"),
                params![id],
                row_to_care_log,
            )
            .optional()?)
    }

    pub fn get_care_logs(&self, plant_id: &str, limit: i64) -> Result<Vec<CareLog>, SprigError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CARE_COLS} FROM care_logs WHERE plant_id = ?1 \
             ORDER BY created_at DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![plant_id, limit], row_to_care_log)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Newest-first care history, capped. Alias kept separate from
    /// get_care_logs so the journal prompt path reads at its own limit.
    pub fn get_plant_care_history(
        &self,
        plant_id: &str,
        limit: i64,
    ) -> Result<Vec<CareLog>, SprigError> {
        self.get_care_logs(plant_id, limit)
    }

    /// Best-effort metadata patch from the enrichment pipeline. Returns false
    /// when the care log is gone (plant deletion cascades), which callers
    /// treat as a quiet no-op.
    pub fn patch_metadata(&self, id: &str, meta: &CareLogMetadata) -> Result<bool, SprigError> {
        let json = serde_json::to_string(meta)
            .map_err(|e| SprigError::Internal(format!("metadata encode: {e}")))?;
        let n = self.conn()?.execute(
            "UPDATE care_logs SET metadata = ?2 WHERE id = ?1",
            params![id, json],
        )?;
        Ok(n > 0)
    }

    pub fn create_journal_entry(
        &self,
        plant_id: &str,
        care_log_id: &str,
        content: &str,
    ) -> Result<Option<JournalEntry>, SprigError> {
        let now = now_ms();
        let id = Uuid::new_v4().to_string();
        // Guarded insert: a plant deleted mid-pipeline yields zero rows
        // instead of an FK error.
        let inserted = self.conn()?.execute(
            "INSERT INTO journal_entries (id, plant_id, care_log_id, content, created_at) \
             SELECT ?1, ?2, ?3, ?4, ?5 WHERE EXISTS (SELECT 1 FROM plants WHERE id = ?2)",
            params![id, plant_id, care_log_id, content, now],
        )?;
        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(JournalEntry {
            id,
            plant_id: plant_id.to_string(),
            care_log_id: care_log_id.to_string(),
            content: content.to_string(),
            created_at: now,
        }))
    }

    pub fn get_journal_entries(
        &self,
        plant_id: &str,
        limit: i64,
    ) -> Result<Vec<JournalEntry>, SprigError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, plant_id, care_log_id, content, created_at FROM journal_entries \
             WHERE plant_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![plant_id, limit], |row| {
            Ok(JournalEntry {
                id: row.get(0)?,
                plant_id: row.get(1)?,
                care_log_id: row.get(2)?,
                content: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
