//! Scripted in-memory catalog for engine and pipeline tests

use super::{CatalogError, Track, TrackCatalog};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Unknown queries return an empty page; slow queries sleep for 30 seconds
#[derive(Default)]
pub(crate) struct FakeCatalog {
    pub(crate) auth_error: Option<CatalogError>,
    pub(crate) responses: HashMap<String, Result<Vec<Track>, CatalogError>>,
    pub(crate) slow_queries: HashSet<String>,
    pub(crate) searched: Mutex<Vec<String>>,
    pub(crate) auth_calls: AtomicUsize,
}

impl FakeCatalog {
    pub(crate) fn respond(mut self, query: &str, result: Result<Vec<Track>, CatalogError>) -> Self {
        self.responses.insert(query.to_string(), result);
        self
    }

    pub(crate) fn searched(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }

    pub(crate) fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackCatalog for FakeCatalog {
    async fn authenticate(&self) -> Result<(), CatalogError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        match &self.auth_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        self.searched.lock().unwrap().push(query.to_string());
        if self.slow_queries.contains(query) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.responses
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
