use anyhow::Context;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, fetch::FetchError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/weather/:city", get(get_weather))
}

/// The slice of the OpenWeatherMap response this API exposes.
#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    weather: Vec<OwmDescription>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct OwmDescription {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub humidity: i64,
    pub wind_speed: f64,
}

#[instrument(skip(state))]
async fn get_weather(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<WeatherReport>, ApiError> {
    let cfg = &state.config.weather;
    let url = format!("{}/weather", cfg.base_url);
    let payload = state
        .fetcher
        .get_json(
            &url,
            &[
                ("q", city.clone()),
                ("appid", cfg.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .await
        .map_err(|e| match e {
            // Upstream tells cities apart from auth failures by status; the
            // message stays fixed either way.
            FetchError::Status { status, .. } => ApiError::Upstream {
                status,
                message: "City not found or API error".into(),
            },
            other => ApiError::from(anyhow::Error::new(other).context("weather fetch")),
        })?;

    let parsed: OwmResponse =
        serde_json::from_value(payload).context("unexpected weather payload shape")?;
    let description = parsed
        .weather
        .into_iter()
        .next()
        .context("weather description missing")?
        .description;

    Ok(Json(WeatherReport {
        city,
        temperature: parsed.main.temp,
        description,
        humidity: parsed.main.humidity,
        wind_speed: parsed.wind.speed,
    }))
}
