use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::{error::ApiError, fetch::FetchError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/soil", get(get_soil_data))
}

#[derive(Debug, Deserialize)]
pub struct SoilQuery {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize, Default)]
struct SoilGridsResponse {
    #[serde(default)]
    properties: SoilProperties,
}

#[derive(Debug, Deserialize, Default)]
struct SoilProperties {
    #[serde(default)]
    layers: Vec<SoilLayer>,
}

#[derive(Debug, Deserialize)]
struct SoilLayer {
    name: Option<String>,
    #[serde(default)]
    depths: Vec<SoilDepth>,
}

#[derive(Debug, Deserialize)]
struct SoilDepth {
    depth_range: Option<Value>,
    values: Option<SoilValues>,
}

#[derive(Debug, Deserialize)]
struct SoilValues {
    mean: Option<f64>,
}

#[derive(Debug, Serialize)]
struct DepthMean {
    depth_range: Option<Value>,
    mean: f64,
}

#[derive(Debug, Serialize)]
pub struct SoilReport {
    latitude: f64,
    longitude: f64,
    soil_properties: BTreeMap<String, Vec<DepthMean>>,
}

/// Depth entries without a mean value are dropped; layers without a name
/// cannot be keyed and are dropped too.
fn reshape_layers(layers: Vec<SoilLayer>) -> BTreeMap<String, Vec<DepthMean>> {
    layers
        .into_iter()
        .filter_map(|layer| {
            let name = layer.name?;
            let depths = layer
                .depths
                .into_iter()
                .filter_map(|d| {
                    let mean = d.values.and_then(|v| v.mean)?;
                    Some(DepthMean {
                        depth_range: d.depth_range,
                        mean,
                    })
                })
                .collect();
            Some((name, depths))
        })
        .collect()
}

#[instrument(skip(state))]
async fn get_soil_data(
    State(state): State<AppState>,
    Query(coords): Query<SoilQuery>,
) -> Result<Json<SoilReport>, ApiError> {
    let payload = state
        .fetcher
        .get_json(
            &state.config.soil.base_url,
            &[
                ("lat", coords.lat.to_string()),
                ("lon", coords.lon.to_string()),
            ],
        )
        .await
        .map_err(|e| match e {
            FetchError::Timeout => ApiError::UpstreamTimeout(
                "Request to SoilGrids timed out. Please try again later.".into(),
            ),
            FetchError::Status { status, body } => ApiError::Upstream {
                status,
                message: format!("SoilGrids API error: {body}"),
            },
            other => ApiError::from(anyhow::Error::new(other).context("soil fetch")),
        })?;

    let parsed: SoilGridsResponse = serde_json::from_value(payload).unwrap_or_default();
    if parsed.properties.layers.is_empty() {
        return Err(ApiError::Upstream {
            status: 500,
            message: "No soil layers found in SoilGrids response".into(),
        });
    }

    Ok(Json(SoilReport {
        latitude: coords.lat,
        longitude: coords.lon,
        soil_properties: reshape_layers(parsed.properties.layers),
    }))
}
