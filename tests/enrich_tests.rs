use std::sync::Arc;

use sprig::ai::{AiConfig, LightReading};
use sprig::db::{CareType, Confidence, PlantDB, PlantInput, SunlightLevel};
use sprig::enrich::{apply_light_reading, run_enrichment, EnrichmentJob};
use sprig::SharedDB;

fn test_db() -> SharedDB {
    Arc::new(PlantDB::open(":memory:").expect("in-memory db"))
}

fn plant(db: &SharedDB) -> sprig::db::Plant {
    db.insert_plant(
        "user-1",
        PlantInput {
            name: "Monstera".into(),
            sunlight_level: Some(SunlightLevel::Low),
            ..Default::default()
        },
    )
    .unwrap()
}

/// AI endpoint nothing listens on — every call fails fast with a connect
/// error, which is exactly the failure mode the pipeline must swallow.
fn dead_ai() -> AiConfig {
    AiConfig::for_endpoint("http://127.0.0.1:9/v1/chat/completions", "test-model")
}

#[tokio::test]
async fn low_confidence_never_mutates() {
    let db = test_db();
    let p = plant(&db);

    let reading = LightReading {
        sunlight_level: SunlightLevel::High,
        confidence: Confidence::Low,
    };
    apply_light_reading(&db, &p.id, reading).await.unwrap();

    let got = db.get_plant(&p.id).unwrap().unwrap();
    assert_eq!(got.sunlight_level, Some(SunlightLevel::Low));
}

#[tokio::test]
async fn medium_confidence_applies() {
    let db = test_db();
    let p = plant(&db);

    let reading = LightReading {
        sunlight_level: SunlightLevel::High,
        confidence: Confidence::Medium,
    };
    apply_light_reading(&db, &p.id, reading).await.unwrap();

    let got = db.get_plant(&p.id).unwrap().unwrap();
    assert_eq!(got.sunlight_level, Some(SunlightLevel::High));
}

#[tokio::test]
async fn deleted_plant_is_a_quiet_noop() {
    let db = test_db();
    let p = plant(&db);
    db.delete_plant(&p.id, "user-1").unwrap();

    let reading = LightReading {
        sunlight_level: SunlightLevel::High,
        confidence: Confidence::High,
    };
    // must not error even though the target is gone
    apply_light_reading(&db, &p.id, reading).await.unwrap();
}

#[tokio::test]
async fn ai_failure_leaves_care_log_untouched() {
    let db = test_db();
    let p = plant(&db);
    let log = db
        .create_care_log(&p.id, CareType::Water, Some("looking good".into()), None)
        .unwrap();

    let job = EnrichmentJob {
        care_log: log.clone(),
        photo_url: "data:image/png;base64,AAAA".into(),
    };
    let result = run_enrichment(&db, &dead_ai(), job).await;
    assert!(result.is_err(), "pipeline should report the backend failure");

    // the committed care log survives, unmodified
    let got = db.get_care_log(&log.id).unwrap().unwrap();
    assert_eq!(got.notes.as_deref(), Some("looking good"));
    assert!(got.metadata.is_none());

    // and no partial enrichment leaked out
    let got_plant = db.get_plant(&p.id).unwrap().unwrap();
    assert_eq!(got_plant.sunlight_level, Some(SunlightLevel::Low));
    assert!(db.get_journal_entries(&p.id, 10).unwrap().is_empty());
}
