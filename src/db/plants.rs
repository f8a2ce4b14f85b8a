//! Plant row operations.

use rusqlite::params;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use super::*;

const PLANT_COLS: &str = "id, user_id, name, species, location, \
    water_frequency_days, fertilizer_frequency_days, last_watered, \
    last_fertilized, next_watering, next_fertilizing, sunlight_level, \
    status, image_path, created_at";

fn row_to_plant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Plant> {
    Ok(Plant {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        species: row.get(3)?,
        location: row.get(4)?,
        water_frequency_days: row.get(5)?,
        fertilizer_frequency_days: row.get(6)?,
        last_watered: row.get(7)?,
        last_fertilized: row.get(8)?,
        next_watering: row.get(9)?,
        next_fertilizing: row.get(10)?,
        sunlight_level: opt_sunlight(row.get(11)?),
        status: row.get(12)?,
        image_path: row.get(13)?,
        created_at: row.get(14)?,
    })
}

impl PlantDB {
    pub fn insert_plant(&self, user_id: &str, input: PlantInput) -> Result<Plant, SprigError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(SprigError::Validation("plant name must not be empty".into()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(SprigError::Validation("plant name too long".into()));
        }

        let water_freq = input.water_frequency_days.unwrap_or(7);
        let fert_freq = input.fertilizer_frequency_days.unwrap_or(30);
        // zero or negative disables scheduling, so only the top end is bounded
        if water_freq > MAX_FREQUENCY_DAYS || fert_freq > MAX_FREQUENCY_DAYS {
            return Err(SprigError::Validation(format!(
                "care frequency exceeds {MAX_FREQUENCY_DAYS} days"
            )));
        }

        let now = now_ms();
        let id = Uuid::new_v4().to_string();

        self.conn()?.execute(
            "INSERT INTO plants \
             (id, user_id, name, species, location, water_frequency_days, \
              fertilizer_frequency_days, sunlight_level, status, image_path, created_at) \
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                id,
                user_id,
                name,
                input.species,
                input.location,
                water_freq,
                fert_freq,
                input.sunlight_level.map(SunlightLevel::as_str),
                input.status,
                input.image_path,
                now,
            ],
        )?;

        Ok(Plant {
            id,
            user_id: user_id.to_string(),
            name,
            species: input.species,
            location: input.location,
            water_frequency_days: water_freq,
            fertilizer_frequency_days: fert_freq,
            last_watered: None,
            last_fertilized: None,
            next_watering: None,
            next_fertilizing: None,
            sunlight_level: input.sunlight_level,
            status: input.status,
            image_path: input.image_path,
            created_at: now,
        })
    }

    pub fn get_plant(&self, id: &str) -> Result<Option<Plant>, SprigError> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {PLANT_COLS} FROM plants WHERE id = ?1"),
                params![id],
                row_to_plant,
            )
            .optional()?)
    }

    /// Lookup scoped to an owner. A plant that exists but belongs to someone
    /// else is indistinguishable from one that doesn't exist.
    pub fn get_plant_owned(&self, id: &str, user_id: &str) -> Result<Option<Plant>, SprigError> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {PLANT_COLS} FROM plants WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                row_to_plant,
            )
            .optional()?)
    }

    pub fn list_plants(&self, user_id: &str) -> Result<Vec<Plant>, SprigError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLANT_COLS} FROM plants WHERE user_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_plant)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_plant(&self, id: &str, user_id: &str) -> Result<bool, SprigError> {
        let n = self.conn()?.execute(
            "DELETE FROM plants WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(n > 0)
    }

    /// Set last/next care timestamps after a scheduler run.
    pub fn touch_care_dates(
        &self,
        id: &str,
        care_type: CareType,
        last: i64,
        next: i64,
    ) -> Result<bool, SprigError> {
        let sql = match care_type {
            CareType::Water => {
                "UPDATE plants SET last_watered = ?2, next_watering = ?3 WHERE id = ?1"
            }
            CareType::Fertilize => {
                "UPDATE plants SET last_fertilized = ?2, next_fertilizing = ?3 WHERE id = ?1"
            }
            CareType::Other => return Ok(false),
        };
        let n = self.conn()?.execute(sql, params![id, last, next])?;
        Ok(n > 0)
    }

    /// Overwrite the plant's sunlight level. Returns false when the plant no
    /// longer exists, so background callers can no-op instead of failing.
    pub fn set_sunlight(&self, id: &str, level: SunlightLevel) -> Result<bool, SprigError> {
        let n = self.conn()?.execute(
            "UPDATE plants SET sunlight_level = ?2 WHERE id = ?1",
            params![id, level.as_str()],
        )?;
        Ok(n > 0)
    }

    /// Plant plus its recent care history, for the journal prompt.
    pub fn get_plant_with_care(&self, id: &str) -> Result<Option<PlantWithCare>, SprigError> {
        let Some(plant) = self.get_plant(id)? else {
            return Ok(None);
        };
        let recent_care = self.get_plant_care_history(id, 20)?;
        Ok(Some(PlantWithCare { plant, recent_care }))
    }
}
