use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, warn};

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/market/price/:crop", get(get_market_price))
}

/// One record of the data.gov.in mandi price feed. All fields arrive as
/// strings and any of them may be absent.
#[derive(Debug, Deserialize)]
struct MandiRecord {
    commodity: Option<String>,
    market: Option<String>,
    state: Option<String>,
    modal_price: Option<String>,
    arrival_date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct MandiResponse {
    #[serde(default)]
    records: Vec<MandiRecord>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PriceReply {
    Found {
        crop: Option<String>,
        market: Option<String>,
        state: Option<String>,
        price: Option<String>,
        unit: &'static str,
        date: Option<String>,
    },
    Missing {
        message: String,
    },
}

#[instrument(skip(state))]
async fn get_market_price(
    State(state): State<AppState>,
    Path(crop): Path<String>,
) -> Result<Json<PriceReply>, ApiError> {
    let cfg = &state.config.market;
    let url = format!("{}/{}", cfg.base_url, cfg.resource_id);
    let payload: Value = state
        .fetcher
        .get_json(
            &url,
            &[
                ("api-key", cfg.api_key.clone()),
                ("format", "json".to_string()),
                ("filters[commodity]", crop.to_lowercase()),
                ("limit", "1".to_string()),
                ("offset", "0".to_string()),
            ],
        )
        .await
        .map_err(|e| {
            warn!(error = %e, crop = %crop, "market fetch failed");
            ApiError::Upstream {
                status: 500,
                message: "Failed to fetch data from market API".into(),
            }
        })?;

    let parsed: MandiResponse = serde_json::from_value(payload).unwrap_or_default();
    let Some(record) = parsed.records.into_iter().next() else {
        return Ok(Json(PriceReply::Missing {
            message: format!("No price data found for '{crop}'"),
        }));
    };

    Ok(Json(PriceReply::Found {
        crop: record.commodity,
        market: record.market,
        state: record.state,
        price: record.modal_price,
        unit: "quintal",
        date: record.arrival_date,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::fetch::testing::ScriptedFetcher;
    use crate::fetch::FetchError;

    #[tokio::test]
    async fn first_record_becomes_the_price_reply() {
        let fetcher = Arc::new(ScriptedFetcher::replying(json!({
            "records": [{
                "commodity": "Wheat",
                "market": "Sitapur",
                "state": "Uttar Pradesh",
                "modal_price": "2150",
                "arrival_date": "18/08/2026",
                "min_price": "2000"
            }]
        })));
        let state = AppState::fake_with_fetcher(fetcher.clone());

        let Json(reply) = get_market_price(State(state), Path("Wheat".into()))
            .await
            .unwrap();

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["crop"], "Wheat");
        assert_eq!(value["price"], "2150");
        assert_eq!(value["unit"], "quintal");
        assert_eq!(value["date"], "18/08/2026");

        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen[0].url, "http://upstream.test/resource/resource-1");
        assert!(seen[0]
            .query
            .contains(&("filters[commodity]".into(), "wheat".into())));
        assert!(seen[0].query.contains(&("limit".into(), "1".into())));
    }

    #[tokio::test]
    async fn no_records_is_a_message_not_an_error() {
        let fetcher = Arc::new(ScriptedFetcher::replying(json!({"records": []})));
        let state = AppState::fake_with_fetcher(fetcher);

        let Json(reply) = get_market_price(State(state), Path("saffron".into()))
            .await
            .unwrap();

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["message"], "No price data found for 'saffron'");
        assert!(value.get("price").is_none());
    }

    #[tokio::test]
    async fn upstream_failure_is_a_fixed_500() {
        let fetcher = Arc::new(ScriptedFetcher::failing(FetchError::Status {
            status: 403,
            body: "bad key".into(),
        }));
        let state = AppState::fake_with_fetcher(fetcher);

        let err = get_market_price(State(state), Path("Wheat".into()))
            .await
            .unwrap_err();
        match err {
            ApiError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to fetch data from market API");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }
}
