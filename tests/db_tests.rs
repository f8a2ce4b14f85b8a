use sprig::db::*;

fn test_db() -> PlantDB {
    PlantDB::open(":memory:").expect("in-memory db")
}

fn fern(db: &PlantDB, user: &str) -> Plant {
    db.insert_plant(
        user,
        PlantInput { name: "Boston Fern".into(), ..Default::default() },
    )
    .unwrap()
}

#[test]
fn plant_crud() {
    let db = test_db();
    let p = db
        .insert_plant(
            "user-1",
            PlantInput {
                name: "Monstera".into(),
                species: Some("Monstera deliciosa".into()),
                location: Some("living room".into()),
                water_frequency_days: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(p.water_frequency_days, 5);
    assert_eq!(p.fertilizer_frequency_days, 30);

    let got = db.get_plant(&p.id).unwrap().unwrap();
    assert_eq!(got.name, "Monstera");
    assert_eq!(got.species.as_deref(), Some("Monstera deliciosa"));

    assert!(db.delete_plant(&p.id, "user-1").unwrap());
    assert!(db.get_plant(&p.id).unwrap().is_none());
}

#[test]
fn reject_empty_plant_name() {
    let db = test_db();
    let r = db.insert_plant("user-1", PlantInput { name: "   ".into(), ..Default::default() });
    assert!(r.is_err());
}

#[test]
fn reject_excessive_care_frequency() {
    let db = test_db();
    for freq in [MAX_FREQUENCY_DAYS + 1, i64::MAX / 2] {
        let r = db.insert_plant(
            "user-1",
            PlantInput {
                name: "Fern".into(),
                water_frequency_days: Some(freq),
                ..Default::default()
            },
        );
        assert!(r.is_err(), "frequency {freq} should be rejected");
        let r = db.insert_plant(
            "user-1",
            PlantInput {
                name: "Fern".into(),
                fertilizer_frequency_days: Some(freq),
                ..Default::default()
            },
        );
        assert!(r.is_err(), "frequency {freq} should be rejected");
    }

    // the bound itself is fine
    let r = db.insert_plant(
        "user-1",
        PlantInput {
            name: "Fern".into(),
            water_frequency_days: Some(MAX_FREQUENCY_DAYS),
            ..Default::default()
        },
    );
    assert!(r.is_ok());
}

#[test]
fn owned_lookup_hides_other_users_plants() {
    let db = test_db();
    let p = fern(&db, "alice");
    assert!(db.get_plant_owned(&p.id, "alice").unwrap().is_some());
    // foreign owner and missing id look identical
    assert!(db.get_plant_owned(&p.id, "bob").unwrap().is_none());
    assert!(db.get_plant_owned("no-such-id", "alice").unwrap().is_none());
}

#[test]
fn delete_scoped_to_owner() {
    let db = test_db();
    let p = fern(&db, "alice");
    assert!(!db.delete_plant(&p.id, "bob").unwrap());
    assert!(db.get_plant(&p.id).unwrap().is_some());
}

#[test]
fn care_logs_newest_first() {
    let db = test_db();
    let p = fern(&db, "alice");
    for i in 0..3 {
        db.create_care_log(&p.id, CareType::Water, Some(format!("n{i}")), None)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    let logs = db.get_care_logs(&p.id, 10).unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs[0].created_at >= logs[1].created_at);
    assert!(logs[1].created_at >= logs[2].created_at);
}

#[test]
fn metadata_patch_roundtrip() {
    let db = test_db();
    let p = fern(&db, "alice");
    let log = db.create_care_log(&p.id, CareType::Water, None, None).unwrap();
    assert!(log.metadata.is_none());

    let meta = CareLogMetadata {
        identity_mismatch: Some(IdentityMismatch {
            detected_plant: Some("Pothos".into()),
            flagged_at: now_ms(),
        }),
    };
    assert!(db.patch_metadata(&log.id, &meta).unwrap());

    let got = db.get_care_log(&log.id).unwrap().unwrap();
    let mm = got.metadata.unwrap().identity_mismatch.unwrap();
    assert_eq!(mm.detected_plant.as_deref(), Some("Pothos"));
}

#[test]
fn metadata_patch_on_missing_log_is_noop() {
    let db = test_db();
    let meta = CareLogMetadata::default();
    assert!(!db.patch_metadata("no-such-log", &meta).unwrap());
}

#[test]
fn set_sunlight_on_missing_plant_is_noop() {
    let db = test_db();
    assert!(!db.set_sunlight("no-such-plant", SunlightLevel::High).unwrap());
}

#[test]
fn sunlight_roundtrip() {
    let db = test_db();
    let p = fern(&db, "alice");
    assert!(p.sunlight_level.is_none());
    assert!(db.set_sunlight(&p.id, SunlightLevel::Medium).unwrap());
    let got = db.get_plant(&p.id).unwrap().unwrap();
    assert_eq!(got.sunlight_level, Some(SunlightLevel::Medium));
}

#[test]
fn journal_entry_requires_live_plant() {
    let db = test_db();
    let p = fern(&db, "alice");
    let log = db.create_care_log(&p.id, CareType::Water, None, None).unwrap();

    let entry = db
        .create_journal_entry(&p.id, &log.id, "We watered the fern today.")
        .unwrap();
    assert!(entry.is_some());

    db.delete_plant(&p.id, "alice").unwrap();
    let entry = db.create_journal_entry(&p.id, &log.id, "ghost entry").unwrap();
    assert!(entry.is_none());
}

#[test]
fn plant_delete_cascades() {
    let db = test_db();
    let p = fern(&db, "alice");
    let log = db.create_care_log(&p.id, CareType::Water, None, None).unwrap();
    db.upsert_reminder(&p, CareType::Water, now_ms()).unwrap();
    db.create_journal_entry(&p.id, &log.id, "entry").unwrap();

    db.delete_plant(&p.id, "alice").unwrap();
    assert!(db.get_care_log(&log.id).unwrap().is_none());
    assert!(db.reminder_for(&p.id, CareType::Water).unwrap().is_none());
    assert!(db.get_journal_entries(&p.id, 10).unwrap().is_empty());
}

#[test]
fn upsert_reminder_is_single_row() {
    let db = test_db();
    let p = fern(&db, "alice");
    let r1 = db.upsert_reminder(&p, CareType::Water, 1000).unwrap();
    let r2 = db.upsert_reminder(&p, CareType::Water, 2000).unwrap();
    assert_eq!(r1.id, r2.id);
    assert_eq!(r2.due_date, 2000);
    assert_eq!(db.list_reminders("alice").unwrap().len(), 1);
}

#[test]
fn get_plant_with_care_bundles_history() {
    let db = test_db();
    let p = fern(&db, "alice");
    db.create_care_log(&p.id, CareType::Water, None, None).unwrap();
    db.create_care_log(&p.id, CareType::Fertilize, None, None).unwrap();

    let with_care = db.get_plant_with_care(&p.id).unwrap().unwrap();
    assert_eq!(with_care.plant.id, p.id);
    assert_eq!(with_care.recent_care.len(), 2);

    assert!(db.get_plant_with_care("no-such-id").unwrap().is_none());
}
