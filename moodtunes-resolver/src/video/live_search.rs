//! Live video search client
//!
//! Relevance-scored search against the video Data API, used when an API key
//! is configured.
//!
//! # API Reference
//! - Search: `GET {api_base_url}/search?part=snippet&type=video&videoEmbeddable=true&maxResults=..&q=..&key=..`
//! - Details: `GET {api_base_url}/videos?part=contentDetails,statistics,status&id=a,b,c&key=..`
//! - Quota exhaustion and key problems come back as HTTP 403

use super::scoring::{score_candidate, CandidateFacts, ScoringTarget};
use super::{search_link, VideoMatch, VideoOutcome};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use moodtunes_common::config::{get_user_agent, RelevanceWeights, VideoConfig};
use moodtunes_common::human_time::{format_clock, parse_iso8601_duration};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Live search errors
///
/// Never surfaced to callers of the matcher; every variant degrades to "no
/// match".
#[derive(Debug, Error)]
pub enum VideoSearchError {
    /// Daily quota spent or key not permitted (403, 429)
    #[error("Video search quota exhausted or access denied (HTTP {0})")]
    QuotaOrPermission(u16),

    #[error("Video search API error (HTTP {0})")]
    Api(u16),

    #[error("Video search timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl VideoSearchError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VideoSearchError::Timeout
        } else {
            // The URL carries the API key
            VideoSearchError::Network(err.without_url().to_string())
        }
    }
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
    status: Option<VideoStatus>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    /// Sent as a decimal string
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoStatus {
    #[serde(default)]
    embeddable: bool,
}

/// One search hit merged with its details
#[derive(Debug, Clone)]
struct Candidate {
    video_id: String,
    title: String,
    channel_title: String,
    thumbnail: String,
    duration_secs: Option<u64>,
    view_count: u64,
    embeddable: bool,
    score: i32,
}

impl Snippet {
    /// Highest resolution thumbnail available
    fn best_thumbnail(&self) -> String {
        ["maxres", "high", "medium", "default"]
            .iter()
            .find_map(|size| self.thumbnails.get(*size))
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

/// Live video search client
pub struct LiveVideoSearch {
    http_client: Client,
    api_base_url: String,
    api_key: String,
    max_results: u32,
    weights: RelevanceWeights,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl LiveVideoSearch {
    pub fn new(
        http_client: Client,
        api_base_url: impl Into<String>,
        api_key: impl Into<String>,
        max_results: u32,
        requests_per_second: u32,
        weights: RelevanceWeights,
    ) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);

        Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_results: max_results.clamp(1, 50),
            weights,
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    /// Build a client from `[video]` settings and an already resolved key
    pub fn from_config(
        config: &VideoConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, VideoSearchError> {
        let http_client = Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| VideoSearchError::Network(e.to_string()))?;

        Ok(Self::new(
            http_client,
            config.api_base_url.clone(),
            api_key,
            config.max_results,
            config.requests_per_second,
            config.weights.clone(),
        ))
    }

    /// Search for the best embeddable video of a track
    ///
    /// Every query runs from most to least specific and hits are merged by
    /// video id in first-seen order. A failing query after earlier hits ends
    /// the search with what was found. With candidates but none embeddable,
    /// the outcome is a plain search link.
    pub async fn search(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<VideoOutcome, VideoSearchError> {
        let mut hits: Vec<(String, Snippet)> = Vec::new();
        let mut seen = HashSet::new();

        for query in candidate_queries(title, artist) {
            let found = match self.search_ids(&query).await {
                Ok(found) => found,
                Err(e) if !hits.is_empty() => {
                    warn!(
                        query = %query,
                        error = %e,
                        "Video search query failed, keeping earlier hits"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            let before = hits.len();
            hits.extend(found.into_iter().filter(|(id, _)| seen.insert(id.clone())));
            debug!(query = %query, new_hits = hits.len() - before, "Video search query complete");
        }

        if hits.is_empty() {
            debug!(title = %title, artist = %artist, "Video search found nothing");
            return Ok(VideoOutcome::NotFound);
        }

        let ids: Vec<String> = hits.iter().map(|(id, _)| id.clone()).collect();
        let details = self.fetch_details(&ids).await?;

        let target = ScoringTarget {
            track_title: title,
            artist,
        };

        let mut candidates: Vec<Candidate> = hits
            .into_iter()
            .map(|(video_id, snippet)| {
                let detail = details.get(&video_id);
                let duration_secs = detail
                    .and_then(|d| d.content_details.as_ref())
                    .and_then(|c| c.duration.as_deref())
                    .and_then(parse_iso8601_duration);
                let view_count = detail
                    .and_then(|d| d.statistics.as_ref())
                    .and_then(|s| s.view_count.as_deref())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                let embeddable = detail
                    .and_then(|d| d.status.as_ref())
                    .is_some_and(|s| s.embeddable);

                let score = score_candidate(
                    &self.weights,
                    target,
                    CandidateFacts {
                        title: &snippet.title,
                        channel_title: &snippet.channel_title,
                        duration_secs,
                    },
                );

                Candidate {
                    thumbnail: snippet.best_thumbnail(),
                    title: snippet.title,
                    channel_title: snippet.channel_title,
                    video_id,
                    duration_secs,
                    view_count,
                    embeddable,
                    score,
                }
            })
            .collect();

        // Highest score first; view count breaks ties
        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.view_count.cmp(&a.view_count))
        });

        match candidates.into_iter().find(|c| c.embeddable) {
            Some(best) => {
                info!(
                    title = %title,
                    artist = %artist,
                    video_id = %best.video_id,
                    score = best.score,
                    "Live video match"
                );
                let mut video = VideoMatch::from_id(
                    &best.video_id,
                    best.title,
                    best.channel_title,
                    best.duration_secs.map(format_clock).unwrap_or_default(),
                );
                if !best.thumbnail.is_empty() {
                    video.thumbnail = best.thumbnail;
                }
                video.relevance_score = Some(best.score);
                Ok(VideoOutcome::Found(video))
            }
            None => {
                debug!(
                    title = %title,
                    artist = %artist,
                    "No embeddable candidate, returning search link"
                );
                Ok(VideoOutcome::SearchOnly {
                    link: search_link(title, artist),
                })
            }
        }
    }

    /// Run one search call; returns `(video id, snippet)` pairs deduplicated by id
    async fn search_ids(&self, query: &str) -> Result<Vec<(String, Snippet)>, VideoSearchError> {
        self.rate_limiter.until_ready().await;

        let max_results = self.max_results.to_string();
        let response = self
            .http_client
            .get(format!("{}/search", self.api_base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("videoEmbeddable", "true"),
                ("maxResults", max_results.as_str()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(VideoSearchError::from_transport)?;

        check_status(response.status())?;

        let body: SearchListResponse = response
            .json()
            .await
            .map_err(|e| VideoSearchError::Parse(format!("search response: {}", e.without_url())))?;

        let mut seen = HashSet::new();
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| Some((item.id.video_id?, item.snippet?)))
            .filter(|(id, _)| seen.insert(id.clone()))
            .collect())
    }

    /// One batched details call for all candidate ids
    async fn fetch_details(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, VideoItem>, VideoSearchError> {
        self.rate_limiter.until_ready().await;

        let joined = ids.join(",");
        let response = self
            .http_client
            .get(format!("{}/videos", self.api_base_url))
            .query(&[
                ("part", "contentDetails,statistics,status"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(VideoSearchError::from_transport)?;

        check_status(response.status())?;

        let body: VideoListResponse = response
            .json()
            .await
            .map_err(|e| VideoSearchError::Parse(format!("videos response: {}", e.without_url())))?;

        Ok(body.items.into_iter().map(|item| (item.id.clone(), item)).collect())
    }
}

fn check_status(status: reqwest::StatusCode) -> Result<(), VideoSearchError> {
    match status.as_u16() {
        403 | 429 => {
            warn!(status = status.as_u16(), "Video search refused (quota or permission)");
            Err(VideoSearchError::QuotaOrPermission(status.as_u16()))
        }
        _ if !status.is_success() => Err(VideoSearchError::Api(status.as_u16())),
        _ => Ok(()),
    }
}

/// Search queries from most to least specific
///
/// Starts with the quoted title and artist plus "official video" and ends
/// with the bare "title artist" pair.
pub fn candidate_queries(title: &str, artist: &str) -> Vec<String> {
    let title = title.trim();
    let artist = artist.trim();
    vec![
        format!("\"{}\" \"{}\" official video", title, artist),
        format!("{} {} official music video", title, artist),
        format!("{} {}", title, artist),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_queries_most_specific_first() {
        let queries = candidate_queries(" Believer ", "Imagine Dragons");
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], "\"Believer\" \"Imagine Dragons\" official video");
        assert_eq!(queries[1], "Believer Imagine Dragons official music video");
        assert_eq!(queries[2], "Believer Imagine Dragons");
    }

    #[test]
    fn test_best_thumbnail_prefers_larger() {
        let snippet: Snippet = serde_json::from_value(serde_json::json!({
            "title": "t",
            "channelTitle": "c",
            "thumbnails": {
                "default": {"url": "https://i.ytimg.com/vi/x/default.jpg"},
                "high": {"url": "https://i.ytimg.com/vi/x/hqdefault.jpg"}
            }
        }))
        .unwrap();
        assert_eq!(snippet.best_thumbnail(), "https://i.ytimg.com/vi/x/hqdefault.jpg");
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status(reqwest::StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(reqwest::StatusCode::FORBIDDEN),
            Err(VideoSearchError::QuotaOrPermission(403))
        ));
        assert!(matches!(
            check_status(reqwest::StatusCode::BAD_GATEWAY),
            Err(VideoSearchError::Api(502))
        ));
    }

    #[test]
    fn test_zero_rate_does_not_panic() {
        let search = LiveVideoSearch::new(
            Client::new(),
            "http://localhost/",
            "key",
            0,
            0,
            RelevanceWeights::default(),
        );
        assert_eq!(search.max_results, 1);
        assert_eq!(search.api_base_url, "http://localhost");
    }
}
