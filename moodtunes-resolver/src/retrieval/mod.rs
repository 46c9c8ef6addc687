//! Track Retrieval Engine
//!
//! Turns audio targets into a ranked, deduplicated list of previewable tracks.
//!
//! # Flow
//! 1. Acquire a catalog token (failure aborts the retrieval)
//! 2. Run up to three primary queries with bounded concurrency
//! 3. Keep previewable tracks, rank by popularity, dedup by identity key
//! 4. Below the limit: run fallback queries and append only net-new tracks
//! 5. Truncate to the limit
//!
//! Individual query failures are logged and absorbed; they never fail the batch.

pub mod query_plan;

pub use query_plan::{fallback_queries, primary_queries, MoodBucket};

use crate::catalog::{CatalogError, Track, TrackCatalog};
use crate::mood::AudioTargetParams;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome counters for one batch of catalog queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBatchReport {
    pub issued: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Still running when the deadline passed
    pub unfinished: usize,
    /// Previewable tracks returned, before dedup
    pub candidates: usize,
}

/// Retrieval result with per-batch reports
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub tracks: Vec<Track>,
    pub primary: QueryBatchReport,
    /// `None` when the primary batch already filled the limit
    pub fallback: Option<QueryBatchReport>,
}

/// Track Retrieval Engine
#[derive(Clone)]
pub struct TrackRetriever {
    catalog: Arc<dyn TrackCatalog>,
    max_concurrent: usize,
}

impl TrackRetriever {
    pub fn new(catalog: Arc<dyn TrackCatalog>, max_concurrent: usize) -> Self {
        Self {
            catalog,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Retrieve tracks with no deadline
    pub async fn retrieve(&self, params: &AudioTargetParams) -> Result<Vec<Track>, CatalogError> {
        self.retrieve_until(params, None).await.map(|r| r.tracks)
    }

    /// Retrieve tracks, abandoning outstanding queries at `deadline`
    ///
    /// Whatever completed before the deadline is ranked and returned.
    pub async fn retrieve_until(
        &self,
        params: &AudioTargetParams,
        deadline: Option<Instant>,
    ) -> Result<Retrieval, CatalogError> {
        self.catalog.authenticate().await.map_err(|e| {
            warn!(error = %e, "Catalog authentication failed, aborting retrieval");
            e
        })?;

        let (candidates, primary) = self
            .run_batch("primary", primary_queries(params), deadline)
            .await;
        let mut tracks = rank_and_dedup(candidates);

        let mut fallback = None;
        if tracks.len() < params.limit && !deadline_passed(deadline) {
            debug!(
                have = tracks.len(),
                limit = params.limit,
                "Primary queries short of limit, running fallback queries"
            );
            let (extra, report) = self
                .run_batch("fallback", fallback_queries(params), deadline)
                .await;
            let added = append_net_new(&mut tracks, extra);
            debug!(added, "Fallback tracks appended");
            fallback = Some(report);
        }

        tracks.truncate(params.limit);

        info!(
            mood = %params.mood,
            tracks = tracks.len(),
            limit = params.limit,
            fallback_used = fallback.is_some(),
            "Track retrieval complete"
        );

        Ok(Retrieval {
            tracks,
            primary,
            fallback,
        })
    }

    async fn run_batch(
        &self,
        batch: &'static str,
        queries: Vec<String>,
        deadline: Option<Instant>,
    ) -> (Vec<Track>, QueryBatchReport) {
        let issued = queries.len();

        let searches = stream::iter(queries.into_iter().enumerate())
            .map(|(index, query)| {
                let catalog = Arc::clone(&self.catalog);
                async move {
                    let result = catalog.search_tracks(&query).await;
                    (index, query, result)
                }
            })
            .buffer_unordered(self.max_concurrent);

        let mut outcomes: Vec<(usize, String, Result<Vec<Track>, CatalogError>)> = match deadline {
            Some(deadline) => {
                searches
                    .take_until(tokio::time::sleep_until(deadline))
                    .collect()
                    .await
            }
            None => searches.collect().await,
        };

        // Completion order is arbitrary; restore query order for stable ranking
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut report = QueryBatchReport {
            issued,
            unfinished: issued - outcomes.len(),
            ..Default::default()
        };
        let mut candidates = Vec::new();

        for (_, query, result) in outcomes {
            match result {
                Ok(found) => {
                    report.succeeded += 1;
                    let before = candidates.len();
                    candidates.extend(found.into_iter().filter(Track::has_preview));
                    debug!(
                        batch,
                        query = %query,
                        previewable = candidates.len() - before,
                        "Query complete"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(batch, query = %query, error = %e, "Catalog query failed");
                }
            }
        }
        report.candidates = candidates.len();

        if report.unfinished > 0 {
            warn!(
                batch,
                unfinished = report.unfinished,
                "Deadline reached with queries outstanding"
            );
        }

        info!(
            batch,
            issued = report.issued,
            succeeded = report.succeeded,
            failed = report.failed,
            candidates = report.candidates,
            "Query batch finished"
        );

        (candidates, report)
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Sort by popularity (descending, stable) and keep the first track per identity key
pub fn rank_and_dedup(mut candidates: Vec<Track>) -> Vec<Track> {
    candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));

    let mut seen = HashSet::new();
    candidates.retain(|track| seen.insert(track.identity_key()));
    candidates
}

/// Append ranked `extra` tracks whose identity key is not already present
///
/// Returns how many were appended.
pub fn append_net_new(tracks: &mut Vec<Track>, extra: Vec<Track>) -> usize {
    let mut seen: HashSet<String> = tracks.iter().map(Track::identity_key).collect();
    let before = tracks.len();

    for track in rank_and_dedup(extra) {
        if seen.insert(track.identity_key()) {
            tracks.push(track);
        }
    }

    tracks.len() - before
}
