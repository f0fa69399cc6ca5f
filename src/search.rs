//! Image search provider client
//!
//! This module defines the seam between the pipeline and the external image
//! search service: the [`ImageSearchProvider`] trait plus the
//! [`GoogleCustomSearch`] implementation backed by the Custom Search JSON
//! API. The provider owns query semantics, ranking, and pagination; this
//! client only issues one request and maps the response into [`Candidate`]
//! values in provider order.

use crate::config::{Credentials, SearchQuery};
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Default Custom Search JSON API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// The API returns at most this many results per request
pub const MAX_PAGE_SIZE: usize = 10;

/// One raw search result before acceptance evaluation
///
/// Ephemeral: lives only during one pipeline pass and is not persisted
/// unless accepted. The provider-reported dimensions are advisory;
/// acceptance decodes the real bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Source URL of the image
    pub url: String,
    /// Content type as reported by the provider, if any
    pub mime: Option<String>,
    /// Result title, if any
    pub title: Option<String>,
    /// Dimensions as reported by the provider, if any
    pub declared_size: Option<(u32, u32)>,
}

/// External search collaborator contract
///
/// Accepts a query plus a raw candidate count and returns an ordered,
/// finite sequence of candidates. It may return fewer candidates than
/// requested and may fail on transient network or quota conditions.
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    /// Issue one search call requesting up to `count` raw candidates
    ///
    /// # Errors
    /// Returns [`ScoutError::Search`] on network or provider failures;
    /// these are retryable at the orchestrator level.
    async fn search(&self, query: &SearchQuery, count: usize) -> Result<Vec<Candidate>>;
}

/// Google Custom Search JSON API client (`searchType=image`)
#[derive(Debug, Clone)]
pub struct GoogleCustomSearch {
    client: Client,
    credentials: Credentials,
    endpoint: String,
}

impl GoogleCustomSearch {
    /// Create a new client with the given credentials
    ///
    /// # Errors
    /// Returns [`ScoutError::Search`] when the HTTP client cannot be built.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ScoutError::network_error("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            credentials,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Override the API endpoint (used by tests against a local server)
    #[must_use]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Clamp a requested raw count to the API's per-page bounds
    fn clamp_count(count: usize) -> usize {
        count.clamp(1, MAX_PAGE_SIZE)
    }

    fn build_params(&self, query: &SearchQuery, count: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", self.credentials.api_key.clone()),
            ("cx", self.credentials.engine_id.clone()),
            ("q", query.text.clone()),
            ("searchType", "image".to_string()),
            ("num", Self::clamp_count(count).to_string()),
        ];
        if let Some(image_type) = query.options.image_type {
            params.push(("imgType", image_type.to_string()));
        }
        if let Some(safe) = query.options.safe {
            params.push(("safe", safe.to_string()));
        }
        if let Some(size) = query.options.size {
            params.push(("imgSize", size.to_string()));
        }
        if let Some(aspect) = query.options.aspect_ratio {
            params.push(("imgAspectRatio", aspect.to_string()));
        }
        params
    }
}

#[async_trait]
impl ImageSearchProvider for GoogleCustomSearch {
    async fn search(&self, query: &SearchQuery, count: usize) -> Result<Vec<Candidate>> {
        let params = self.build_params(query, count);
        log::debug!("Searching '{}' (num={})", query.text, Self::clamp_count(count));

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| ScoutError::network_error("Search request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            // The API wraps failures in an error envelope; surface its
            // message when present.
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(ScoutError::search(format!(
                "Search provider error: {}",
                detail
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::network_error("Failed to parse search response", e))?;

        let candidates: Vec<Candidate> = parsed
            .items
            .unwrap_or_default()
            .into_iter()
            .map(SearchItem::into_candidate)
            .collect();

        log::debug!("Provider returned {} candidate(s)", candidates.len());
        Ok(candidates)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Absent entirely when the query has no results
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
    mime: Option<String>,
    title: Option<String>,
    image: Option<ItemImage>,
}

#[derive(Debug, Deserialize)]
struct ItemImage {
    width: Option<u32>,
    height: Option<u32>,
}

impl SearchItem {
    fn into_candidate(self) -> Candidate {
        let declared_size = match self.image {
            Some(ItemImage {
                width: Some(width),
                height: Some(height),
            }) => Some((width, height)),
            _ => None,
        };
        Candidate {
            url: self.link,
            mime: self.mime,
            title: self.title,
            declared_size,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageType, SafeLevel, SearchOptions};

    fn test_client() -> GoogleCustomSearch {
        GoogleCustomSearch::new(Credentials::new("test-key", "test-cx")).unwrap()
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(GoogleCustomSearch::clamp_count(0), 1);
        assert_eq!(GoogleCustomSearch::clamp_count(1), 1);
        assert_eq!(GoogleCustomSearch::clamp_count(10), 10);
        assert_eq!(GoogleCustomSearch::clamp_count(16), 10);
    }

    #[test]
    fn test_build_params_minimal() {
        let client = test_client();
        let query = SearchQuery::new("mountain");
        let params = client.build_params(&query, 2);

        assert!(params.contains(&("key", "test-key".to_string())));
        assert!(params.contains(&("cx", "test-cx".to_string())));
        assert!(params.contains(&("q", "mountain".to_string())));
        assert!(params.contains(&("searchType", "image".to_string())));
        assert!(params.contains(&("num", "2".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "imgType"));
    }

    #[test]
    fn test_build_params_with_filters() {
        let client = test_client();
        let query = SearchQuery::with_options(
            "mountain",
            SearchOptions {
                image_type: Some(ImageType::Photo),
                safe: Some(SafeLevel::High),
                ..SearchOptions::default()
            },
        );
        let params = client.build_params(&query, 20);

        assert!(params.contains(&("imgType", "photo".to_string())));
        assert!(params.contains(&("safe", "high".to_string())));
        // Over-requested counts are clamped to the page cap
        assert!(params.contains(&("num", "10".to_string())));
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "items": [
                {
                    "link": "https://example.com/a.jpg",
                    "mime": "image/jpeg",
                    "title": "A mountain",
                    "image": { "width": 2560, "height": 1440 }
                },
                {
                    "link": "https://example.com/b.png"
                }
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let candidates: Vec<Candidate> = parsed
            .items
            .unwrap()
            .into_iter()
            .map(SearchItem::into_candidate)
            .collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "https://example.com/a.jpg");
        assert_eq!(candidates[0].mime.as_deref(), Some("image/jpeg"));
        assert_eq!(candidates[0].declared_size, Some((2560, 1440)));
        assert_eq!(candidates[1].url, "https://example.com/b.png");
        assert_eq!(candidates[1].mime, None);
        assert_eq!(candidates[1].declared_size, None);
    }

    #[test]
    fn test_empty_response_deserialization() {
        // The API omits "items" entirely for zero-result queries
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_none());
    }

    #[test]
    fn test_error_envelope_deserialization() {
        let body = r#"{"error": {"code": 403, "message": "Quota exceeded"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(
            envelope.error.unwrap().message.as_deref(),
            Some("Quota exceeded")
        );
    }
}
