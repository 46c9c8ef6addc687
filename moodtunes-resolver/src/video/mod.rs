//! Cross-Catalog Video Matcher
//!
//! Pairs a resolved track with a video. Two modes:
//! - **Static**: tiered string matching against [`StaticVideoCatalog`]; always available
//! - **Live**: relevance-scored search via [`LiveVideoSearch`] when an API key is
//!   configured, falling back to the static catalog when live search finds nothing
//!
//! Matching never fails: quota, permission and transport problems are logged
//! and treated as "no match".

pub mod live_search;
pub mod scoring;
pub mod static_catalog;

pub use live_search::{LiveVideoSearch, VideoSearchError};
pub use scoring::score_candidate;
pub use static_catalog::{CatalogEntry, MatchTier, StaticVideoCatalog};

use crate::catalog::Track;
use crate::normalize::normalize_key;
use moodtunes_common::human_time::format_clock_ms;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const SEARCH_RESULTS_URL: &str = "https://www.youtube.com/results";

/// A playable video paired with a track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMatch {
    #[serde(rename = "id")]
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub thumbnail: String,
    /// `m:ss` or `h:mm:ss`; empty when unknown
    pub duration: String,
    pub embed_url: String,
    pub watch_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<i32>,
}

impl VideoMatch {
    /// Derive embed, watch and thumbnail URLs from a video id
    pub fn from_id(
        video_id: &str,
        title: impl Into<String>,
        channel_title: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.to_string(),
            title: title.into(),
            channel_title: channel_title.into(),
            thumbnail: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", video_id),
            duration: duration.into(),
            embed_url: format!("https://www.youtube.com/embed/{}", video_id),
            watch_url: format!("https://www.youtube.com/watch?v={}", video_id),
            relevance_score: None,
        }
    }
}

/// Result of matching one track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum VideoOutcome {
    Found(VideoMatch),
    NotFound,
    /// Candidates exist but none can be embedded
    SearchOnly { link: String },
}

impl VideoOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, VideoOutcome::Found(_))
    }

    /// `None` for [`VideoOutcome::NotFound`]
    pub fn into_option(self) -> Option<VideoOutcome> {
        match self {
            VideoOutcome::NotFound => None,
            other => Some(other),
        }
    }
}

/// Non-embedded search results link for a track
pub fn search_link(title: &str, artist: &str) -> String {
    let query = format!("{} {}", artist.trim(), title.trim());
    reqwest::Url::parse_with_params(SEARCH_RESULTS_URL, [("search_query", query.as_str())])
        .map(|url| url.to_string())
        .unwrap_or_else(|_| SEARCH_RESULTS_URL.to_string())
}

/// Which matching mode is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoMode {
    Static,
    Live,
}

/// Cross-catalog video matcher
#[derive(Clone)]
pub struct VideoMatcher {
    static_catalog: Arc<StaticVideoCatalog>,
    live: Option<Arc<LiveVideoSearch>>,
}

impl VideoMatcher {
    pub fn new(
        static_catalog: Arc<StaticVideoCatalog>,
        live: Option<Arc<LiveVideoSearch>>,
    ) -> Self {
        Self { static_catalog, live }
    }

    /// Static-catalog matching only
    pub fn static_only(static_catalog: Arc<StaticVideoCatalog>) -> Self {
        Self::new(static_catalog, None)
    }

    pub fn mode(&self) -> VideoMode {
        if self.live.is_some() {
            VideoMode::Live
        } else {
            VideoMode::Static
        }
    }

    /// Match a title and artist
    pub async fn match_video(&self, title: &str, artist: &str) -> VideoOutcome {
        if normalize_key(title).is_empty() || normalize_key(artist).is_empty() {
            debug!(
                title = %title,
                artist = %artist,
                "Empty title or artist, skipping video match"
            );
            return VideoOutcome::NotFound;
        }

        if let Some(live) = &self.live {
            match live.search(title, artist).await {
                Ok(VideoOutcome::NotFound) => {
                    debug!(
                        title = %title,
                        artist = %artist,
                        "Live search empty, trying static catalog"
                    );
                }
                Ok(outcome) => return outcome,
                Err(e) => {
                    warn!(
                        title = %title,
                        artist = %artist,
                        error = %e,
                        "Live video search failed, trying static catalog"
                    );
                }
            }
        }

        self.static_catalog
            .lookup(title, artist)
            .map(VideoOutcome::Found)
            .unwrap_or(VideoOutcome::NotFound)
    }

    /// Match a resolved track by its title and primary artist
    ///
    /// Static matches without a known duration take the track's duration.
    pub async fn match_track(&self, track: &Track) -> VideoOutcome {
        let artist = track.primary_artist().unwrap_or_default();
        match self.match_video(&track.title, artist).await {
            VideoOutcome::Found(mut video) => {
                if video.duration.is_empty() && track.duration_ms > 0 {
                    video.duration = format_clock_ms(track.duration_ms);
                }
                VideoOutcome::Found(video)
            }
            other => other,
        }
    }
}
