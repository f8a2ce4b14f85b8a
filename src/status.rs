//! Care status derivation.
//!
//! A plant's displayed status is a pure function of its stored dates. The
//! precedence lives in [`RULES`], an ordered table evaluated until the first
//! match, so the order itself can be asserted in tests. The single-plant view
//! and the dashboard aggregation both go through [`derive_status`]; they must
//! never disagree.

use serde::Serialize;

/// Everything status derivation is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct StatusInput<'a> {
    pub next_watering: Option<i64>,
    pub next_fertilizing: Option<i64>,
    pub stored_status: Option<&'a str>,
    pub now: i64,
}

impl<'a> StatusInput<'a> {
    pub fn from_plant(plant: &'a crate::db::Plant, now: i64) -> Self {
        Self {
            next_watering: plant.next_watering,
            next_fertilizing: plant.next_fertilizing,
            stored_status: plant.status.as_deref(),
            now,
        }
    }
}

/// Serde requires untagged variants to come last; the display precedence
/// lives in [`RULES`], not in this declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantStatus {
    NeedsWater,
    NeedsFertilizer,
    Healthy,
    /// The plant's free-form stored label, passed through.
    #[serde(untagged)]
    Stored(String),
}

/// What a matched rule resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NeedsWater,
    NeedsFertilizer,
    StoredLabel,
    Healthy,
}

pub struct StatusRule {
    pub name: &'static str,
    pub applies: fn(&StatusInput<'_>) -> bool,
    pub outcome: Outcome,
}

/// Ordered: first match wins. Overdue care outranks the stored label, which
/// outranks the healthy default.
pub const RULES: &[StatusRule] = &[
    StatusRule {
        name: "watering_overdue",
        applies: |s| s.next_watering.is_some_and(|t| t <= s.now),
        outcome: Outcome::NeedsWater,
    },
    StatusRule {
        name: "fertilizing_overdue",
        applies: |s| s.next_fertilizing.is_some_and(|t| t <= s.now),
        outcome: Outcome::NeedsFertilizer,
    },
    StatusRule {
        name: "stored_label",
        applies: |s| s.stored_status.is_some_and(|v| !v.trim().is_empty()),
        outcome: Outcome::StoredLabel,
    },
    StatusRule {
        name: "default_healthy",
        applies: |_| true,
        outcome: Outcome::Healthy,
    },
];

pub fn derive_status(input: &StatusInput<'_>) -> PlantStatus {
    for rule in RULES {
        if (rule.applies)(input) {
            return match rule.outcome {
                Outcome::NeedsWater => PlantStatus::NeedsWater,
                Outcome::NeedsFertilizer => PlantStatus::NeedsFertilizer,
                Outcome::StoredLabel => PlantStatus::Stored(
                    input.stored_status.unwrap_or_default().trim().to_string(),
                ),
                Outcome::Healthy => PlantStatus::Healthy,
            };
        }
    }
    // unreachable: the last rule always applies
    PlantStatus::Healthy
}
