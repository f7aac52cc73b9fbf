use serde::Deserialize;

use crate::error::ApiError;

/// Manual entry for `POST /schemes/add`. Every field is required here,
/// unlike portal-synced rows which may omit most of them.
#[derive(Debug, Deserialize)]
pub struct SchemeInput {
    pub title: String,
    pub description: String,
    pub department: String,
    pub eligibility: String,
    pub link: String,
}

impl SchemeInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(self.link.starts_with("http://") || self.link.starts_with("https://")) {
            return Err(ApiError::BadRequest("link must be an http(s) URL".into()));
        }
        Ok(())
    }
}
