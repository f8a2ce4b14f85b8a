use sprig::db::DAY_MS;
use sprig::status::{derive_status, Outcome, PlantStatus, StatusInput, RULES};

fn input<'a>(
    next_watering: Option<i64>,
    next_fertilizing: Option<i64>,
    stored_status: Option<&'a str>,
    now: i64,
) -> StatusInput<'a> {
    StatusInput { next_watering, next_fertilizing, stored_status, now }
}

#[test]
fn healthy_by_default() {
    let s = derive_status(&input(None, None, None, 1000));
    assert_eq!(s, PlantStatus::Healthy);
}

#[test]
fn overdue_watering_wins() {
    let now = 10 * DAY_MS;
    let s = derive_status(&input(Some(now - DAY_MS), None, None, now));
    assert_eq!(s, PlantStatus::NeedsWater);
}

#[test]
fn due_exactly_now_counts_as_overdue() {
    let now = 10 * DAY_MS;
    let s = derive_status(&input(Some(now), None, None, now));
    assert_eq!(s, PlantStatus::NeedsWater);
}

#[test]
fn future_watering_is_not_due() {
    let now = 10 * DAY_MS;
    let s = derive_status(&input(Some(now + 1), None, None, now));
    assert_eq!(s, PlantStatus::Healthy);
}

#[test]
fn overdue_fertilizing() {
    let now = 10 * DAY_MS;
    let s = derive_status(&input(None, Some(now - 1), None, now));
    assert_eq!(s, PlantStatus::NeedsFertilizer);
}

#[test]
fn water_outranks_fertilizer() {
    let now = 10 * DAY_MS;
    let s = derive_status(&input(Some(now - 1), Some(now - 1), None, now));
    assert_eq!(s, PlantStatus::NeedsWater);
}

#[test]
fn stored_label_outranks_healthy() {
    let s = derive_status(&input(None, None, Some("repotting"), 1000));
    assert_eq!(s, PlantStatus::Stored("repotting".into()));
}

#[test]
fn overdue_care_outranks_stored_label() {
    let now = 10 * DAY_MS;
    let s = derive_status(&input(Some(now - 1), None, Some("repotting"), now));
    assert_eq!(s, PlantStatus::NeedsWater);
}

#[test]
fn blank_stored_label_falls_through_to_healthy() {
    let s = derive_status(&input(None, None, Some("   "), 1000));
    assert_eq!(s, PlantStatus::Healthy);
}

#[test]
fn idempotent_on_unchanged_input() {
    let now = 10 * DAY_MS;
    let i = input(Some(now - 1), Some(now - 2), Some("droopy"), now);
    let first = derive_status(&i);
    for _ in 0..10 {
        assert_eq!(derive_status(&i), first);
    }
}

#[test]
fn rule_table_order_is_fixed() {
    let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
    assert_eq!(
        names,
        vec!["watering_overdue", "fertilizing_overdue", "stored_label", "default_healthy"],
    );
    assert_eq!(RULES.last().unwrap().outcome, Outcome::Healthy);
}

#[test]
fn status_serializes_as_plain_strings() {
    assert_eq!(serde_json::to_value(PlantStatus::NeedsWater).unwrap(), "needs_water");
    assert_eq!(serde_json::to_value(PlantStatus::Healthy).unwrap(), "healthy");
    assert_eq!(
        serde_json::to_value(PlantStatus::Stored("droopy".into())).unwrap(),
        "droopy",
    );
}
