use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/crop/recommend", post(recommend_crop))
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub soil_type: String,
    pub rainfall: f64,
    pub season: String,
}

#[derive(Debug, Serialize)]
pub struct Recommendation {
    pub recommended_crop: &'static str,
}

/// Placeholder rule table standing in for a future recommendation model.
/// Rainfall is accepted but does not influence the rules yet.
fn recommend(soil_type: &str, _rainfall: f64, season: &str) -> &'static str {
    match (soil_type, season) {
        ("loamy", "kharif") => "Rice",
        ("clay", "rabi") => "Wheat",
        _ => "Maize",
    }
}

#[instrument]
async fn recommend_crop(Json(payload): Json<RecommendRequest>) -> Json<Recommendation> {
    Json(Recommendation {
        recommended_crop: recommend(&payload.soil_type, payload.rainfall, &payload.season),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_table_matches_known_pairs() {
        assert_eq!(recommend("loamy", 800.0, "kharif"), "Rice");
        assert_eq!(recommend("clay", 300.0, "rabi"), "Wheat");
    }

    #[test]
    fn anything_else_falls_back_to_maize() {
        assert_eq!(recommend("loamy", 800.0, "rabi"), "Maize");
        assert_eq!(recommend("clay", 300.0, "kharif"), "Maize");
        assert_eq!(recommend("sandy", 0.0, "zaid"), "Maize");
        assert_eq!(recommend("", 0.0, ""), "Maize");
    }

    #[tokio::test]
    async fn handler_echoes_the_rule_result() {
        let Json(reply) = recommend_crop(Json(RecommendRequest {
            soil_type: "loamy".into(),
            rainfall: 820.0,
            season: "kharif".into(),
        }))
        .await;
        assert_eq!(reply.recommended_crop, "Rice");
    }
}
