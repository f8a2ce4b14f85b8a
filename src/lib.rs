pub mod ai;
pub mod api;
pub mod db;
pub mod enrich;
pub mod error;
pub mod photo;
pub mod prompts;
pub mod scheduler;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

pub type SharedDB = Arc<db::PlantDB>;

/// Run a blocking DB operation on tokio's blocking thread pool.
///
/// All synchronous PlantDB calls in async context MUST go through this
/// to avoid starving tokio worker threads.
pub async fn db_call<F, T>(db: &SharedDB, f: F) -> Result<T, error::SprigError>
where
    F: FnOnce(&db::PlantDB) -> T + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| error::SprigError::Internal(e.to_string()))
}

#[derive(Clone)]
pub struct AppState {
    pub db: SharedDB,
    pub ai: Option<ai::AiConfig>,
    pub api_key: Option<String>,
    pub photo_dir: PathBuf,
    pub started_at: std::time::Instant,
}
