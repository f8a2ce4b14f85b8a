//! Talks to an OpenAI-compatible API for the vision and language
//! capabilities. All optional — see AiConfig::from_env().

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::db::{Confidence, PlantWithCare, SunlightLevel};
use crate::error::SprigError;
use crate::prompts;

fn ai_err(msg: impl Into<String>) -> SprigError {
    SprigError::AiBackend(msg.into())
}

const AI_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AiConfig {
    pub llm_url: String,
    pub llm_key: String,
    pub llm_model: String,
    /// Model for photo classification; falls back to llm_model.
    pub vision_model: Option<String>,
    pub client: reqwest::Client,
}

impl AiConfig {
    /// Returns `None` if `SPRIG_LLM_URL` is not set.
    pub fn from_env() -> Option<Self> {
        let llm_url = std::env::var("SPRIG_LLM_URL").ok()?;
        let llm_key = std::env::var("SPRIG_LLM_KEY").unwrap_or_default();
        let llm_model =
            std::env::var("SPRIG_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        let vision_model = std::env::var("SPRIG_VISION_MODEL").ok();

        let client = reqwest::Client::builder()
            .timeout(AI_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Some(Self { llm_url, llm_key, llm_model, vision_model, client })
    }

    /// Test/bench constructor pointing at an arbitrary endpoint.
    pub fn for_endpoint(url: &str, model: &str) -> Self {
        Self {
            llm_url: url.to_string(),
            llm_key: String::new(),
            llm_model: model.to_string(),
            vision_model: None,
            client: reqwest::Client::builder()
                .timeout(AI_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub fn model_for_vision(&self) -> &str {
        self.vision_model.as_deref().unwrap_or(&self.llm_model)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
}

/// Content is a JSON value so user messages can carry `image_url` parts
/// alongside plain strings.
#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(Serialize)]
struct ToolDef {
    #[serde(rename = "type")]
    tool_type: String,
    function: FunctionDef,
}

#[derive(Serialize)]
struct FunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Deserialize)]
struct ToolCallFunction {
    arguments: String,
}

/// Call the LLM with a function/tool definition, get back structured JSON.
/// Forces the model to call the named function and parses the arguments.
async fn llm_tool_call<T: serde::de::DeserializeOwned>(
    cfg: &AiConfig,
    model: &str,
    system: &str,
    user_content: serde_json::Value,
    fn_name: &str,
    fn_desc: &str,
    parameters: serde_json::Value,
) -> Result<T, SprigError> {
    let req = ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage { role: "system".into(), content: system.into() },
            ChatMessage { role: "user".into(), content: user_content },
        ],
        temperature: 0.1,
        tools: Some(vec![ToolDef {
            tool_type: "function".into(),
            function: FunctionDef {
                name: fn_name.into(),
                description: fn_desc.into(),
                parameters,
            },
        }]),
        tool_choice: Some(serde_json::json!({"type": "function", "function": {"name": fn_name}})),
    };

    let mut builder = cfg.client.post(&cfg.llm_url).json(&req);
    if !cfg.llm_key.is_empty() {
        builder = builder.header("Authorization", format!("Bearer {}", cfg.llm_key));
    }

    let resp = builder
        .send()
        .await
        .map_err(|e| ai_err(format!("LLM request failed: {e}")))?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ai_err(format!("LLM returned {status}: {body}")));
    }

    let chat: ChatResponse = resp
        .json()
        .await
        .map_err(|e| ai_err(format!("LLM response parse failed: {e}")))?;

    let args = chat
        .choices
        .first()
        .and_then(|c| c.message.tool_calls.as_ref())
        .and_then(|tc| tc.first())
        .map(|tc| tc.function.arguments.clone())
        .ok_or_else(|| ai_err("no tool call in response"))?;

    serde_json::from_str(&args)
        .map_err(|e| ai_err(format!("tool call arguments parse failed: {e}: {args}")))
}

/// The vision capability's answer for a single photo.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LightReading {
    pub sunlight_level: SunlightLevel,
    pub confidence: Confidence,
}

/// Classify ambient light level from a photo data URL.
pub async fn classify_light(cfg: &AiConfig, photo_url: &str) -> Result<LightReading, SprigError> {
    debug!(model = cfg.model_for_vision(), "classifying light level");
    let user = serde_json::json!([
        { "type": "text", "text": "Estimate the light level for this plant." },
        { "type": "image_url", "image_url": { "url": photo_url } },
    ]);
    llm_tool_call(
        cfg,
        cfg.model_for_vision(),
        prompts::LIGHT_SYSTEM_PROMPT,
        user,
        "report_light_level",
        "Report the estimated light level and confidence for the photo",
        prompts::classify_light_schema(),
    )
    .await
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityVerdict {
    pub matches: bool,
    #[serde(default)]
    pub detected_plant: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JournalOutcome {
    pub narrative: String,
    #[serde(default)]
    pub identity_match: Option<IdentityVerdict>,
}

/// Write a journal entry for a care event, optionally judging whether the
/// photo depicts the plant on record.
pub async fn generate_journal(
    cfg: &AiConfig,
    care_log: &crate::db::CareLog,
    plant_with_care: &PlantWithCare,
    photo_url: Option<&str>,
) -> Result<JournalOutcome, SprigError> {
    debug!(model = %cfg.llm_model, plant = %plant_with_care.plant.id, "generating journal entry");

    let context = serde_json::json!({
        "plant": plant_with_care.plant,
        "recent_care": plant_with_care.recent_care,
        "event": care_log,
    });
    let mut parts = vec![serde_json::json!({
        "type": "text",
        "text": format!("Plant record and care history:\n{context}"),
    })];
    if let Some(url) = photo_url {
        parts.push(serde_json::json!({
            "type": "image_url",
            "image_url": { "url": url },
        }));
    }

    llm_tool_call(
        cfg,
        &cfg.llm_model,
        prompts::JOURNAL_SYSTEM_PROMPT,
        serde_json::Value::Array(parts),
        "write_journal_entry",
        "Write the journal entry and optional identity verdict",
        prompts::generate_journal_schema(),
    )
    .await
}
