use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{instrument, warn};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/assistant/ask", post(ask_assistant))
}

const SYSTEM_PROMPT: &str = "You are AgroMitra, an AI assistant for farmers. \
    Answer simply and in Hindi if the farmer asks in Hindi.";

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskReply {
    pub query: String,
    pub answer: String,
}

fn build_chat_body(model: &str, query: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": SYSTEM_PROMPT},
            {"role": "user", "content": query},
        ],
        "temperature": 0.6,
        "max_tokens": 200,
    })
}

fn extract_answer(payload: &Value) -> Option<&str> {
    payload
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

#[instrument(skip(state, payload))]
async fn ask_assistant(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskReply>, ApiError> {
    let cfg = &state.config.assistant;
    let url = format!("{}/chat/completions", cfg.base_url);
    let body = build_chat_body(&cfg.model, &payload.query);

    let response = state
        .fetcher
        .post_json(&url, Some(&cfg.api_key), &body)
        .await
        .map_err(|e| {
            warn!(error = %e, "assistant upstream call failed");
            ApiError::Upstream {
                status: 500,
                message: format!("Assistant request failed: {e}"),
            }
        })?;

    let answer = extract_answer(&response).ok_or_else(|| {
        warn!("assistant response had no answer text");
        ApiError::Upstream {
            status: 500,
            message: "Malformed response from assistant service".into(),
        }
    })?;

    Ok(Json(AskReply {
        query: payload.query,
        answer: answer.to_string(),
    }))
}
