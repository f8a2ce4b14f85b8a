use axum::extract::State;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use subtle::ConstantTimeEq;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::SprigError;
use crate::AppState;

mod care;
mod plants;
mod reminders;

use care::*;
use plants::*;
use reminders::*;

/// Run a blocking closure on the spawn_blocking pool and map JoinError.
async fn blocking<T, F>(f: F) -> Result<T, SprigError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SprigError::Internal(e.to_string()))
}

/// Requesting identity, resolved upstream by the auth layer and forwarded as
/// the x-user-id header. Missing header means the request never went through
/// auth — reject it.
fn get_user_id(headers: &axum::http::HeaderMap) -> Result<String, SprigError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
        .filter(|s| !s.is_empty())
        .ok_or(SprigError::Unauthorized)
}

/// Auth middleware: checks Bearer token if SPRIG_API_KEY is configured.
async fn require_auth(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, SprigError> {
    let Some(ref expected) = state.api_key else {
        return Ok(next.run(req).await);
    };

    let unauthorized = || SprigError::Unauthorized;

    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;

    let token = header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;

    // constant-time comparison to prevent timing attacks
    if token.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(next.run(req).await)
    } else {
        Err(unauthorized())
    }
}

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(index))
        .route("/health", get(health));

    let protected = Router::new()
        .route("/plants", post(create_plant).get(list_plants))
        .route("/plants/{id}", get(get_plant).delete(delete_plant))
        .route("/plants/{id}/care", post(create_care_log).get(list_care_logs))
        .route("/plants/{id}/journal", get(list_journal))
        .route("/reminders", get(list_reminders))
        .route("/reminders/{id}", patch(update_reminder))
        .route("/dashboard", get(dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // 10MB covers base64 photo payloads
    public
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db = state.db.clone();
    let (plants, care_logs, reminders) = blocking(move || db.counts()).await.unwrap_or((0, 0, 0));

    Json(serde_json::json!({
        "name": "sprig",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "ai_enabled": state.ai.is_some(),
        "plants": plants,
        "care_logs": care_logs,
        "reminders": reminders,
    }))
}

async fn index(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "sprig",
        "version": env!("CARGO_PKG_VERSION"),
        "ai_enabled": state.ai.is_some(),
        "endpoints": [
            "POST /plants", "GET /plants", "GET /plants/{id}", "DELETE /plants/{id}",
            "POST /plants/{id}/care", "GET /plants/{id}/care", "GET /plants/{id}/journal",
            "GET /reminders", "PATCH /reminders/{id}",
            "GET /dashboard", "GET /health",
        ],
    }))
}
