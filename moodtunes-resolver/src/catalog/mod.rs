//! Music catalog access
//!
//! - [`TokenCache`]: shared client-credentials token slot with single-flight refresh
//! - [`CatalogClient`]: authenticated track search over HTTP
//! - [`TrackCatalog`]: the seam the retrieval engine searches through

pub mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod token_cache;
pub mod types;

pub use client::CatalogClient;
pub use token_cache::{AccessToken, CatalogCredentials, TokenCache};
pub use types::{Album, AlbumImage, Track, TrackArtist};

use async_trait::async_trait;
use thiserror::Error;

/// Catalog errors
///
/// Display strings never contain credentials, tokens or upstream response
/// bodies.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    /// Client id/secret not configured
    #[error("Catalog credentials not configured")]
    Configuration,

    /// Credential exchange rejected by the catalog
    #[error("Catalog rejected the client credentials")]
    Authentication,

    /// Catalog overloaded or down (5xx, 429); retryable
    #[error("Catalog temporarily unavailable (HTTP {0})")]
    UpstreamUnavailable(u16),

    /// A search was refused with the cached token
    #[error("Catalog access token rejected")]
    TokenRejected,

    #[error("Catalog API error (HTTP {0})")]
    Api(u16),

    #[error("Catalog request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Worth retrying later without operator action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::UpstreamUnavailable(_)
                | CatalogError::Timeout
                | CatalogError::Network(_)
                | CatalogError::TokenRejected
        )
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::Timeout
        } else {
            // Strip the URL; queries can carry user text
            CatalogError::Network(err.without_url().to_string())
        }
    }
}

/// Track search as seen by the retrieval engine
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Ensure a usable access token exists
    ///
    /// Failure here is fatal for the whole retrieval.
    async fn authenticate(&self) -> Result<(), CatalogError>;

    /// Run one search; returns every mapped track, preview or not
    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError>;
}
