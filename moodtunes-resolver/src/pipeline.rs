//! Mood-to-music resolution pipeline
//!
//! Mapper → Retrieval Engine → Video Matcher, under one request budget. Once the
//! budget runs out the pipeline stops waiting and returns what it has: tracks
//! whose video lookup had not finished come back with `video = None`.

use crate::catalog::{CatalogError, Track};
use crate::mood::{AudioTargetParams, MoodMapper, MoodSelection};
use crate::retrieval::TrackRetriever;
use crate::video::{VideoMatcher, VideoOutcome};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Pipeline errors
///
/// Only token acquisition can abort a resolution; everything else degrades.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A track with its video, if one was found in time
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTrack {
    pub track: Track,
    pub video: Option<VideoOutcome>,
}

/// Pipeline output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicResolution {
    pub request_id: Uuid,
    pub description: String,
    pub tracks: Vec<ResolvedTrack>,
    pub params: AudioTargetParams,
    /// Requested mood was unknown; the default mood was used
    pub fallback_used: bool,
    /// Request budget ran out before every step completed
    pub partial: bool,
}

/// Mood-to-music resolution pipeline
#[derive(Clone)]
pub struct MoodPipeline {
    mapper: MoodMapper,
    retriever: TrackRetriever,
    videos: Option<VideoMatcher>,
    budget: Duration,
    max_concurrent_lookups: usize,
}

impl MoodPipeline {
    /// `videos = None` disables video pairing
    pub fn new(
        mapper: MoodMapper,
        retriever: TrackRetriever,
        videos: Option<VideoMatcher>,
        budget: Duration,
        max_concurrent_lookups: usize,
    ) -> Self {
        Self {
            mapper,
            retriever,
            videos,
            budget,
            max_concurrent_lookups: max_concurrent_lookups.max(1),
        }
    }

    pub fn mapper(&self) -> &MoodMapper {
        &self.mapper
    }

    pub fn videos(&self) -> Option<&VideoMatcher> {
        self.videos.as_ref()
    }

    /// Resolve a mood selection into tracks paired with videos
    pub async fn resolve_music(
        &self,
        selection: &MoodSelection,
    ) -> Result<MusicResolution, PipelineError> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let deadline = started + self.budget;

        let resolution = self.mapper.resolve(selection);
        info!(
            request_id = %request_id,
            mood = %resolution.params.mood,
            intensity = resolution.params.intensity,
            fallback_used = resolution.fallback_used,
            "Resolving music for mood"
        );

        let retrieval = self
            .retriever
            .retrieve_until(&resolution.params, Some(deadline))
            .await
            .map_err(|e| {
                warn!(request_id = %request_id, error = %e, "Track retrieval aborted");
                PipelineError::from(e)
            })?;

        let mut partial = retrieval.primary.unfinished > 0
            || retrieval.fallback.as_ref().is_some_and(|r| r.unfinished > 0);

        let videos = match &self.videos {
            Some(matcher) => {
                let (videos, unfinished) = self
                    .match_videos(matcher, &retrieval.tracks, deadline)
                    .await;
                if unfinished > 0 {
                    warn!(
                        request_id = %request_id,
                        unfinished,
                        "Request budget spent before all video lookups finished"
                    );
                    partial = true;
                }
                videos
            }
            None => vec![None; retrieval.tracks.len()],
        };

        let tracks: Vec<ResolvedTrack> = retrieval
            .tracks
            .into_iter()
            .zip(videos)
            .map(|(track, video)| ResolvedTrack { track, video })
            .collect();

        info!(
            request_id = %request_id,
            tracks = tracks.len(),
            videos = tracks.iter().filter(|t| t.video.is_some()).count(),
            partial,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Music resolution complete"
        );

        Ok(MusicResolution {
            request_id,
            description: resolution.description,
            tracks,
            params: resolution.params,
            fallback_used: resolution.fallback_used,
            partial,
        })
    }

    /// Match videos for every track; slot `i` belongs to `tracks[i]`
    ///
    /// Returns the slots plus how many lookups were cut off by the deadline.
    async fn match_videos(
        &self,
        matcher: &VideoMatcher,
        tracks: &[Track],
        deadline: Instant,
    ) -> (Vec<Option<VideoOutcome>>, usize) {
        let mut slots: Vec<Option<VideoOutcome>> = vec![None; tracks.len()];

        let completed: Vec<(usize, VideoOutcome)> = stream::iter(tracks.iter().cloned().enumerate())
            .map(|(index, track)| {
                let matcher = matcher.clone();
                async move { (index, matcher.match_track(&track).await) }
            })
            .buffer_unordered(self.max_concurrent_lookups)
            .take_until(tokio::time::sleep_until(deadline))
            .collect()
            .await;

        let unfinished = tracks.len() - completed.len();
        for (index, outcome) in completed {
            slots[index] = outcome.into_option();
        }

        (slots, unfinished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::FakeCatalog;
    use crate::catalog::types::fixtures::track;
    use crate::mood::{MoodId, MoodTable};
    use crate::retrieval::primary_queries;
    use crate::video::StaticVideoCatalog;
    use std::sync::Arc;

    fn pipeline(catalog: FakeCatalog, videos: bool) -> MoodPipeline {
        let mapper = MoodMapper::new(Arc::new(MoodTable::builtin()), 5);
        let retriever = TrackRetriever::new(Arc::new(catalog), 4);
        let matcher =
            videos.then(|| VideoMatcher::static_only(Arc::new(StaticVideoCatalog::builtin())));
        MoodPipeline::new(mapper, retriever, matcher, Duration::from_secs(5), 4)
    }

    fn first_query(mood: &str) -> String {
        let mapper = MoodMapper::new(Arc::new(MoodTable::builtin()), 5);
        primary_queries(&mapper.map(&MoodSelection::new(mood, 70.0)))[0].clone()
    }

    #[tokio::test]
    async fn test_resolves_tracks_with_videos() {
        let catalog = FakeCatalog::default().respond(
            &first_query("energetic"),
            Ok(vec![
                track("1", "Blinding Lights", "The Weeknd", 95, true),
                track("2", "Obscure B-Side", "Nobody Known", 20, true),
            ]),
        );

        let resolution = pipeline(catalog, true)
            .resolve_music(&MoodSelection::new("energetic", 70.0))
            .await
            .unwrap();

        assert_eq!(resolution.params.mood, MoodId::Energetic);
        assert!(!resolution.fallback_used);
        assert!(!resolution.partial);
        assert!(resolution.description.contains("energetic"));
        assert_eq!(resolution.tracks.len(), 2);

        match &resolution.tracks[0].video {
            Some(VideoOutcome::Found(video)) => assert_eq!(video.video_id, "4NRXx6U8ABQ"),
            other => panic!("expected video, got {:?}", other),
        }
        assert!(resolution.tracks[1].video.is_none());
    }

    #[tokio::test]
    async fn test_resolution_runs_on_spawned_task() {
        let catalog = FakeCatalog::default().respond(
            &first_query("energetic"),
            Ok(vec![track("1", "Blinding Lights", "The Weeknd", 95, true)]),
        );
        let pipeline = Arc::new(pipeline(catalog, true));

        let handle = tokio::spawn({
            let pipeline = Arc::clone(&pipeline);
            async move {
                pipeline
                    .resolve_music(&MoodSelection::new("energetic", 70.0))
                    .await
            }
        });
        let resolution = handle.await.unwrap().unwrap();

        assert_eq!(resolution.tracks.len(), 1);
        assert!(resolution.tracks[0].video.as_ref().is_some_and(VideoOutcome::is_found));
    }

    #[tokio::test]
    async fn test_videos_disabled() {
        let catalog = FakeCatalog::default().respond(
            &first_query("happy"),
            Ok(vec![track("1", "Blinding Lights", "The Weeknd", 95, true)]),
        );

        let resolution = pipeline(catalog, false)
            .resolve_music(&MoodSelection::new("happy", 70.0))
            .await
            .unwrap();

        assert_eq!(resolution.tracks.len(), 1);
        assert!(resolution.tracks[0].video.is_none());
    }

    #[tokio::test]
    async fn test_configuration_error_aborts() {
        let catalog = FakeCatalog {
            auth_error: Some(CatalogError::Configuration),
            ..Default::default()
        };

        let err = pipeline(catalog, true)
            .resolve_music(&MoodSelection::new("happy", 50.0))
            .await
            .unwrap_err();

        assert_eq!(err, PipelineError::Catalog(CatalogError::Configuration));
    }

    #[tokio::test]
    async fn test_unknown_mood_reports_fallback() {
        let resolution = pipeline(FakeCatalog::default(), true)
            .resolve_music(&MoodSelection::new("bewildered", 50.0))
            .await
            .unwrap();

        assert!(resolution.fallback_used);
        assert_eq!(resolution.params.mood, MoodId::DEFAULT);
        assert!(resolution.tracks.is_empty());
    }

    #[tokio::test]
    async fn test_budget_returns_partial_results() {
        let fast = first_query("happy");
        let mapper = MoodMapper::new(Arc::new(MoodTable::builtin()), 5);
        let slow = primary_queries(&mapper.map(&MoodSelection::new("happy", 70.0)))[1].clone();

        let mut catalog = FakeCatalog::default()
            .respond(&fast, Ok(vec![track("1", "Quick", "Someone", 50, true)]));
        catalog.slow_queries.insert(slow);

        let pipeline = MoodPipeline::new(
            mapper,
            TrackRetriever::new(Arc::new(catalog), 4),
            None,
            Duration::from_millis(200),
            4,
        );

        let resolution = pipeline
            .resolve_music(&MoodSelection::new("happy", 70.0))
            .await
            .unwrap();

        assert!(resolution.partial);
        assert_eq!(resolution.tracks.len(), 1);
    }

    #[test]
    fn test_resolution_serializes_camel_case() {
        let resolution = MusicResolution {
            request_id: Uuid::nil(),
            description: "d".to_string(),
            tracks: vec![ResolvedTrack {
                track: track("1", "Song", "Artist", 1, true),
                video: None,
            }],
            params: MoodMapper::new(Arc::new(MoodTable::builtin()), 5)
                .map(&MoodSelection::new("happy", 50.0)),
            fallback_used: false,
            partial: false,
        };

        let json = serde_json::to_value(&resolution).unwrap();
        assert!(json.get("requestId").is_some());
        assert!(json.get("fallbackUsed").is_some());
        assert!(json["tracks"][0]["video"].is_null());
        assert_eq!(json["tracks"][0]["track"]["name"], "Song");
    }
}
