//! SQLite-backed storage for plants, care logs, reminders, and journal
//! entries.

mod care;
mod plants;
mod reminders;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::error::SprigError;

/// Set busy_timeout and foreign_keys on every connection handed out by the
/// pool. The busy timeout prevents SQLITE_BUSY when background enrichment
/// writes race API traffic; foreign_keys is per-connection in SQLite and the
/// cascade deletes depend on it.
#[derive(Debug)]
struct BusyTimeoutCustomizer;
impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error> for BusyTimeoutCustomizer {
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(())
    }
}

type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

const MAX_NAME_LEN: usize = 128;
const MAX_NOTES_LEN: usize = 4096;

/// Ten years between waterings is already absurd; anything beyond it is a
/// client bug, and unbounded values would overflow due-date arithmetic.
pub const MAX_FREQUENCY_DAYS: i64 = 3650;

pub const DAY_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareType {
    Water,
    Fertilize,
    Other,
}

impl CareType {
    pub fn as_str(self) -> &'static str {
        match self {
            CareType::Water => "water",
            CareType::Fertilize => "fertilize",
            CareType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self, SprigError> {
        match s {
            "water" => Ok(CareType::Water),
            "fertilize" => Ok(CareType::Fertilize),
            "other" => Ok(CareType::Other),
            _ => Err(SprigError::Validation(format!(
                "invalid care type: {s} (expected water, fertilize, or other)"
            ))),
        }
    }

    /// Verb used in reminder titles.
    pub fn verb(self) -> &'static str {
        match self {
            CareType::Water => "Water",
            CareType::Fertilize => "Fertilize",
            CareType::Other => "Tend",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunlightLevel {
    Low,
    Medium,
    High,
}

impl SunlightLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SunlightLevel::Low => "low",
            SunlightLevel::Medium => "medium",
            SunlightLevel::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(SunlightLevel::Low),
            "medium" => Some(SunlightLevel::Medium),
            "high" => Some(SunlightLevel::High),
            _ => None,
        }
    }
}

/// Qualitative reliability tier attached to an AI classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Completed,
    Dismissed,
}

impl ReminderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Completed => "completed",
            ReminderStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, SprigError> {
        match s {
            "pending" => Ok(ReminderStatus::Pending),
            "completed" => Ok(ReminderStatus::Completed),
            "dismissed" => Ok(ReminderStatus::Dismissed),
            _ => Err(SprigError::Validation(format!(
                "invalid reminder status: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub water_frequency_days: i64,
    pub fertilizer_frequency_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watered: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fertilized: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_watering: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_fertilizing: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunlight_level: Option<SunlightLevel>,
    /// Free-form fallback label shown when no care is due.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    pub created_at: i64,
}

impl Plant {
    pub fn frequency_for(&self, care_type: CareType) -> Option<i64> {
        match care_type {
            CareType::Water => Some(self.water_frequency_days),
            CareType::Fertilize => Some(self.fertilizer_frequency_days),
            CareType::Other => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlantInput {
    pub name: String,
    pub species: Option<String>,
    pub location: Option<String>,
    pub water_frequency_days: Option<i64>,
    pub fertilizer_frequency_days: Option<i64>,
    pub sunlight_level: Option<SunlightLevel>,
    pub status: Option<String>,
    pub image_path: Option<String>,
}

/// Structured extension data attached to a care log after the fact.
/// Only written by the enrichment pipeline, at most once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareLogMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_mismatch: Option<IdentityMismatch>,
}

/// The AI judged the submitted photo likely depicts a different plant
/// than the one on record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityMismatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_plant: Option<String>,
    pub flagged_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareLog {
    pub id: String,
    pub plant_id: String,
    pub care_type: CareType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CareLogMetadata>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub plant_id: String,
    pub user_id: String,
    pub care_type: CareType,
    pub title: String,
    pub due_date: i64,
    pub status: ReminderStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub plant_id: String,
    pub care_log_id: String,
    pub content: String,
    pub created_at: i64,
}

/// A plant together with its recent care history, gathered for the
/// journal-generation prompt.
#[derive(Debug, Clone, Serialize)]
pub struct PlantWithCare {
    pub plant: Plant,
    pub recent_care: Vec<CareLog>,
}

pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_millis() as i64
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS plants (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    species TEXT,
    location TEXT,
    water_frequency_days INTEGER NOT NULL DEFAULT 7,
    fertilizer_frequency_days INTEGER NOT NULL DEFAULT 30,
    last_watered INTEGER,
    last_fertilized INTEGER,
    next_watering INTEGER,
    next_fertilizing INTEGER,
    sunlight_level TEXT,
    status TEXT,
    image_path TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_plants_user ON plants(user_id);

CREATE TABLE IF NOT EXISTS care_logs (
    id TEXT PRIMARY KEY,
    plant_id TEXT NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
    care_type TEXT NOT NULL,
    notes TEXT,
    photo_path TEXT,
    metadata TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_care_logs_plant ON care_logs(plant_id, created_at);

CREATE TABLE IF NOT EXISTS reminders (
    id TEXT PRIMARY KEY,
    plant_id TEXT NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    care_type TEXT NOT NULL,
    title TEXT NOT NULL,
    due_date INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at INTEGER NOT NULL,
    UNIQUE(plant_id, care_type)
);
CREATE INDEX IF NOT EXISTS idx_reminders_user ON reminders(user_id, due_date);

CREATE TABLE IF NOT EXISTS journal_entries (
    id TEXT PRIMARY KEY,
    plant_id TEXT NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
    care_log_id TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_journal_plant ON journal_entries(plant_id, created_at);
"#;

pub struct PlantDB {
    pool: Pool<SqliteConnectionManager>,
}

impl PlantDB {
    pub fn open(path: &str) -> Result<Self, SprigError> {
        let pool_size = if path == ":memory:" { 2 } else { 8 };
        let manager = if path == ":memory:" {
            // Shared cache so all pool connections see the same in-memory DB.
            // Each test gets a unique name to avoid cross-test pollution.
            let name = uuid::Uuid::new_v4().to_string();
            SqliteConnectionManager::file(format!("file:{name}?mode=memory&cache=shared"))
        } else {
            SqliteConnectionManager::file(path)
        };
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(BusyTimeoutCustomizer))
            .build(manager)
            .map_err(|e| SprigError::Internal(format!("pool: {e}")))?;

        let conn = pool.get().map_err(|e| SprigError::Internal(e.to_string()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        if conn.prepare("SELECT image_path FROM plants LIMIT 0").is_err() {
            conn.execute("ALTER TABLE plants ADD COLUMN image_path TEXT", [])?;
        }
        drop(conn);
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConn, SprigError> {
        self.pool
            .get()
            .map_err(|e| SprigError::Internal(format!("pool: {e}")))
    }

    pub fn counts(&self) -> (i64, i64, i64) {
        let count = |sql: &str| -> i64 {
            self.conn()
                .ok()
                .and_then(|c| c.query_row(sql, [], |r| r.get(0)).ok())
                .unwrap_or(0)
        };
        (
            count("SELECT COUNT(*) FROM plants"),
            count("SELECT COUNT(*) FROM care_logs"),
            count("SELECT COUNT(*) FROM reminders"),
        )
    }
}

fn opt_sunlight(v: Option<String>) -> Option<SunlightLevel> {
    v.as_deref().and_then(SunlightLevel::parse)
}

fn opt_metadata(v: Option<String>) -> Option<CareLogMetadata> {
    v.as_deref().and_then(|s| serde_json::from_str(s).ok())
}
