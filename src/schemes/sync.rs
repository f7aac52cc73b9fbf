use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::repo;

/// One scheme as served by the agriculture portal feed.
#[derive(Debug, Clone)]
pub struct PortalScheme {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub new_schemes_added: usize,
    pub ids: Vec<Uuid>,
}

/// The portal serves either `{"schemes": [...]}` or a bare array. Entries
/// without a title are dropped; a missing description becomes "".
pub(crate) fn parse_portal_payload(payload: &Value) -> Vec<PortalScheme> {
    let entries = match payload.get("schemes") {
        Some(inner) => inner.as_array(),
        None => payload.as_array(),
    };
    let Some(entries) = entries else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?.trim();
            if title.is_empty() {
                return None;
            }
            Some(PortalScheme {
                title: title.to_string(),
                description: entry
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                link: entry
                    .get("link")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Keep only schemes whose title is not already stored.
pub(crate) fn filter_new(
    fetched: Vec<PortalScheme>,
    existing: &HashSet<String>,
) -> Vec<PortalScheme> {
    fetched
        .into_iter()
        .filter(|s| !existing.contains(&s.title))
        .collect()
}

/// Pull the portal feed and insert schemes not yet in the table.
pub async fn sync_schemes(state: &AppState) -> Result<SyncReport, ApiError> {
    let portal_url = &state.config.schemes.portal_url;
    let payload = state
        .fetcher
        .get_json(portal_url, &[])
        .await
        .map_err(|e| {
            warn!(error = %e, url = %portal_url, "schemes portal fetch failed");
            ApiError::Upstream {
                status: 500,
                message: format!("Failed to sync schemes: {e}"),
            }
        })?;

    let fetched = parse_portal_payload(&payload);
    let existing = repo::existing_titles(&state.db, 1000).await?;
    let fresh = filter_new(fetched, &existing);

    let mut ids = Vec::with_capacity(fresh.len());
    for scheme in &fresh {
        ids.push(repo::insert_synced(&state.db, scheme).await?);
    }

    info!(added = ids.len(), "schemes sync finished");
    Ok(SyncReport {
        new_schemes_added: ids.len(),
        ids,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_wrapped_and_bare_payloads() {
        let wrapped = json!({"schemes": [
            {"title": "PM-KISAN", "description": "Income support", "link": "https://pmkisan.gov.in"},
        ]});
        let bare = json!([
            {"title": "PM-KISAN", "description": "Income support"},
        ]);

        let from_wrapped = parse_portal_payload(&wrapped);
        let from_bare = parse_portal_payload(&bare);
        assert_eq!(from_wrapped.len(), 1);
        assert_eq!(from_wrapped[0].title, "PM-KISAN");
        assert_eq!(from_wrapped[0].link.as_deref(), Some("https://pmkisan.gov.in"));
        assert_eq!(from_bare[0].description, "Income support");
        assert_eq!(from_bare[0].link, None);
    }

    #[test]
    fn entries_without_title_are_dropped() {
        let payload = json!({"schemes": [
            {"description": "no title here"},
            {"title": "   "},
            {"title": "e-NAM"},
        ]});
        let parsed = parse_portal_payload(&payload);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "e-NAM");
        assert_eq!(parsed[0].description, "");
    }

    #[test]
    fn unexpected_shapes_parse_to_nothing() {
        assert!(parse_portal_payload(&json!({"data": []})).is_empty());
        assert!(parse_portal_payload(&json!("just a string")).is_empty());
        assert!(parse_portal_payload(&json!({"schemes": "oops"})).is_empty());
    }

    #[test]
    fn already_known_titles_are_filtered_out() {
        let fetched = vec![
            PortalScheme {
                title: "PM-KISAN".into(),
                description: String::new(),
                link: None,
            },
            PortalScheme {
                title: "e-NAM".into(),
                description: String::new(),
                link: None,
            },
        ];
        let existing: HashSet<String> = ["PM-KISAN".to_string()].into_iter().collect();

        let fresh = filter_new(fetched, &existing);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].title, "e-NAM");
    }
}
