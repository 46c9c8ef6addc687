//! moodtunes-resolver library interface
//!
//! Mood-to-music resolution: mood mapping, catalog retrieval with a shared
//! token cache, cross-catalog video matching, and the HTTP surface over them.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mood;
pub mod normalize;
pub mod pipeline;
pub mod retrieval;
pub mod video;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use catalog::{CatalogClient, TokenCache, TrackCatalog};
use chrono::{DateTime, Utc};
use mood::{MoodMapper, MoodTable};
use moodtunes_common::config::TomlConfig;
use moodtunes_common::{Error, Result};
use pipeline::MoodPipeline;
use retrieval::TrackRetriever;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use video::{LiveVideoSearch, StaticVideoCatalog, VideoMatcher, VideoMode};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<MoodPipeline>,
    /// Catalog client id and secret were both resolved at startup
    pub catalog_configured: bool,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: MoodPipeline, catalog_configured: bool) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            catalog_configured,
            startup_time: Utc::now(),
        }
    }

    /// Wire every component from bootstrap config and resolved credentials
    ///
    /// Missing catalog credentials do not fail startup; resolutions then return
    /// "service unavailable". An unreadable replacement video catalog does.
    pub fn from_config(config: &TomlConfig) -> Result<Self> {
        let credentials = crate::config::resolve_catalog_credentials(config);
        let catalog_configured = credentials.is_some();

        let http_client = CatalogClient::build_http_client(&config.catalog)
            .map_err(|e| Error::Internal(format!("catalog HTTP client: {}", e)))?;
        let tokens = Arc::new(TokenCache::new(
            http_client.clone(),
            config.catalog.auth_url.clone(),
            credentials,
        ));
        let catalog: Arc<dyn TrackCatalog> = Arc::new(CatalogClient::new(
            http_client,
            config.catalog.api_base_url.clone(),
            config.catalog.market.clone(),
            config.catalog.search_limit,
            tokens,
        ));
        let retriever = TrackRetriever::new(catalog, config.catalog.max_concurrent_queries);

        let mapper = MoodMapper::new(
            Arc::new(MoodTable::builtin()),
            config.catalog.default_track_limit,
        );

        let videos = if config.pipeline.match_videos {
            Some(build_video_matcher(config)?)
        } else {
            info!("Video matching disabled");
            None
        };

        let pipeline = MoodPipeline::new(
            mapper,
            retriever,
            videos,
            Duration::from_secs(config.pipeline.request_budget_secs),
            config.video.max_concurrent_lookups,
        );

        Ok(Self::new(pipeline, catalog_configured))
    }

    pub fn video_mode(&self) -> Option<VideoMode> {
        self.pipeline.videos().map(VideoMatcher::mode)
    }
}

fn build_video_matcher(config: &TomlConfig) -> Result<VideoMatcher> {
    let static_catalog = match &config.video.catalog_path {
        Some(path) => StaticVideoCatalog::load(path)?,
        None => StaticVideoCatalog::builtin(),
    };

    let live = match crate::config::resolve_video_api_key(config) {
        Some(key) => {
            let search = LiveVideoSearch::from_config(&config.video, key)
                .map_err(|e| Error::Internal(format!("video HTTP client: {}", e)))?;
            Some(Arc::new(search))
        }
        None => None,
    };

    let matcher = VideoMatcher::new(Arc::new(static_catalog), live);
    info!(mode = ?matcher.mode(), "Video matcher ready");
    Ok(matcher)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::resolve_routes())
        .merge(api::mood_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
