//! sprig — plant care tracker with AI-assisted enrichment.
//! Care logs in, reminders out; photos feed a best-effort background
//! pipeline for light estimation and journal writing.

use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sprig::{ai, api, db, AppState, SharedDB};

#[derive(Parser)]
#[command(name = "sprig", version, about = "Plant care tracker with AI-assisted enrichment")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3412", env = "SPRIG_PORT")]
    port: u16,

    /// SQLite database path
    #[arg(short, long, default_value = "sprig.db", env = "SPRIG_DB")]
    db: String,

    /// Directory for uploaded care photos
    #[arg(long, default_value = "photos", env = "SPRIG_PHOTO_DIR")]
    photo_dir: std::path::PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let pdb = db::PlantDB::open(&args.db).expect("failed to open database");
    let shared: SharedDB = Arc::new(pdb);

    let ai_cfg = ai::AiConfig::from_env();
    let ai_status = match &ai_cfg {
        Some(cfg) => format!("llm={}, vision={}", cfg.llm_model, cfg.model_for_vision()),
        None => "disabled".into(),
    };

    let api_key = std::env::var("SPRIG_API_KEY").ok();
    let auth_status = if api_key.is_some() { "enabled" } else { "disabled" };

    let state = AppState {
        db: shared,
        ai: ai_cfg,
        api_key,
        photo_dir: args.photo_dir,
        started_at: std::time::Instant::now(),
    };
    let app = api::router(state);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        db = %args.db,
        ai = %ai_status,
        auth = auth_status,
        "sprig starting"
    );

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("server error");
}
