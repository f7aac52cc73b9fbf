use std::time::Duration;

use axum::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failure modes of an upstream fetch. Routes decide how each maps onto the
/// API error taxonomy (passthrough status, 500, 504, ...).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid JSON payload: {0}")]
    Decode(String),
}

/// Uniform contract for all outbound HTTP: the weather/market/soil proxies,
/// the assistant forwarder and the scheme sync all go through this seam, so
/// tests can swap in a scripted implementation.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` with the given query pairs; expects a JSON body on 2xx.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError>;

    /// POST a JSON body to `url`, optionally with a bearer token; expects a
    /// JSON body on 2xx.
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<Value, FetchError>;
}

pub struct ReqwestFetcher {
    http: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        debug!(url, "outbound GET");
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_reqwest)?;
        read_json(resp).await
    }

    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<Value, FetchError> {
        debug!(url, "outbound POST");
        let mut req = self.http.post(url).json(body);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(map_reqwest)?;
        read_json(resp).await
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}

async fn read_json(resp: reqwest::Response) -> Result<Value, FetchError> {
    let status = resp.status();
    let body = resp.text().await.map_err(map_reqwest)?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
}
