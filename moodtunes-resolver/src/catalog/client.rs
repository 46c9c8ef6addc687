//! Catalog search client
//!
//! Authenticated track search against the catalog Web API.
//!
//! # API Reference
//! - Endpoint: `GET {api_base_url}/search?q=..&type=track&limit=..&market=..`
//! - Auth: `Authorization: Bearer <token>` from the shared [`TokenCache`]

use super::types::{RawTrack, SearchResponse, Track};
use super::{CatalogError, TokenCache, TrackCatalog};
use async_trait::async_trait;
use moodtunes_common::config::{get_user_agent, CatalogConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Catalog caps a single search page at 50 results
const MAX_SEARCH_LIMIT: u32 = 50;

/// Catalog search client
///
/// Cheap to share behind an `Arc`; the token cache is shared with every other
/// holder of the same `Arc<TokenCache>`.
pub struct CatalogClient {
    http_client: Client,
    api_base_url: String,
    market: String,
    search_limit: u32,
    tokens: Arc<TokenCache>,
}

impl CatalogClient {
    pub fn new(
        http_client: Client,
        api_base_url: impl Into<String>,
        market: impl Into<String>,
        search_limit: u32,
        tokens: Arc<TokenCache>,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            market: market.into(),
            search_limit: search_limit.clamp(1, MAX_SEARCH_LIMIT),
            tokens,
        }
    }

    /// Build the HTTP client used for both auth and search
    pub fn build_http_client(config: &CatalogConfig) -> Result<Client, CatalogError> {
        Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))
    }
}

#[async_trait]
impl TrackCatalog for CatalogClient {
    async fn authenticate(&self) -> Result<(), CatalogError> {
        self.tokens.get_token().await.map(|_| ())
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let token = self.tokens.get_token().await?;
        let limit = self.search_limit.to_string();

        debug!(query = %query, limit = self.search_limit, "Catalog search");

        let response = self
            .http_client
            .get(format!("{}/search", self.api_base_url))
            .bearer_auth(token.value())
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", limit.as_str()),
                ("market", self.market.as_str()),
            ])
            .send()
            .await
            .map_err(CatalogError::from_transport)?;

        let status = response.status();

        if status.as_u16() == 401 {
            warn!(query = %query, "Catalog refused access token, invalidating cache");
            self.tokens.invalidate_if(token.value()).await;
            return Err(CatalogError::TokenRejected);
        }

        if status.as_u16() == 429 || status.is_server_error() {
            return Err(CatalogError::UpstreamUnavailable(status.as_u16()));
        }

        if !status.is_success() {
            return Err(CatalogError::Api(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("search response: {}", e.without_url())))?;

        let tracks: Vec<Track> = body
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(RawTrack::into_track)
            .collect();

        debug!(query = %query, results = tracks.len(), "Catalog search complete");

        Ok(tracks)
    }
}
