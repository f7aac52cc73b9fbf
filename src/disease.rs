use axum::{
    extract::{DefaultBodyLimit, Multipart},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/disease/detect", post(detect_disease))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

#[derive(Debug, Serialize)]
pub struct DetectionReply {
    pub disease: &'static str,
    pub treatment: &'static str,
}

/// Placeholder detection: the upload is accepted and discarded, the verdict
/// is fixed until an image model replaces this.
#[instrument(skip(mp))]
async fn detect_disease(mut mp: Multipart) -> Result<Json<DetectionReply>, ApiError> {
    let mut image_bytes: Option<Bytes> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("unreadable upload: {e}")))?;
            image_bytes = Some(data);
            break;
        }
    }

    let Some(data) = image_bytes else {
        return Err(ApiError::BadRequest("file is required".into()));
    };
    debug!(size = data.len(), "leaf image received");

    Ok(Json(DetectionReply {
        disease: "Leaf Rust",
        treatment: "Use fungicide XYZ",
    }))
}
