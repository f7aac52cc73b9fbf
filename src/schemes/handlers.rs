use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{error::ApiError, state::AppState};

use super::{dto::SchemeInput, repo, sync};

pub fn scheme_routes() -> Router<AppState> {
    Router::new()
        .route("/schemes/all", get(list_schemes))
        .route("/schemes/add", post(add_scheme))
        .route("/schemes/sync", post(sync_schemes))
        .route("/schemes/demo/populate", post(populate_demo))
}

#[instrument(skip(state))]
async fn list_schemes(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let schemes = repo::list_schemes(&state.db, 100).await?;
    Ok(Json(json!({ "schemes": schemes })))
}

#[instrument(skip(state, payload))]
async fn add_scheme(
    State(state): State<AppState>,
    Json(payload): Json<SchemeInput>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;
    let id = repo::insert_scheme(&state.db, &payload).await?;
    info!(scheme_id = %id, title = %payload.title, "scheme added manually");
    Ok(Json(json!({ "message": "Scheme added successfully" })))
}

#[instrument(skip(state))]
async fn sync_schemes(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let report = sync::sync_schemes(&state).await?;
    Ok(Json(json!({ "status": "success", "details": report })))
}

/// Seeds a few well known schemes so a fresh install has data to show.
#[instrument(skip(state))]
async fn populate_demo(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let demo = [
        SchemeInput {
            title: "Pradhan Mantri Awas Yojana".into(),
            description: "Affordable housing for all.".into(),
            department: "Ministry of Housing and Urban Affairs".into(),
            eligibility: "Low income group".into(),
            link: "https://pmaymis.gov.in/".into(),
        },
        SchemeInput {
            title: "Startup India".into(),
            description: "Support and funding for startups.".into(),
            department: "Ministry of Commerce".into(),
            eligibility: "Recognized startups".into(),
            link: "https://www.startupindia.gov.in/".into(),
        },
        SchemeInput {
            title: "Digital India".into(),
            description: "Digital infrastructure for all citizens.".into(),
            department: "Ministry of Electronics and IT".into(),
            eligibility: "All Indian citizens".into(),
            link: "https://www.digitalindia.gov.in/".into(),
        },
    ];

    for scheme in &demo {
        repo::insert_scheme(&state.db, scheme).await?;
    }
    info!(count = demo.len(), "demo schemes inserted");
    Ok(Json(json!({ "message": "Dummy schemes inserted successfully" })))
}
