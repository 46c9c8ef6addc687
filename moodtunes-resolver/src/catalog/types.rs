//! Track shapes: the internal `Track` returned to callers, and the raw catalog
//! search payload it is mapped from.

use crate::normalize::normalize_key;
use serde::{Deserialize, Serialize};

/// A resolved catalog track
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    #[serde(rename = "name")]
    pub title: String,
    /// Primary artist first
    pub artists: Vec<TrackArtist>,
    pub album: Album,
    pub preview_url: Option<String>,
    pub external_url: String,
    pub duration_ms: u64,
    pub popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackArtist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub images: Vec<AlbumImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl Track {
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    /// Has a non-empty preview clip playable in-app
    pub fn has_preview(&self) -> bool {
        self.preview_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// `normalize(title) | normalize(primary artist)`
    ///
    /// Two tracks with the same key are the same song for dedup purposes.
    pub fn identity_key(&self) -> String {
        format!(
            "{}|{}",
            normalize_key(&self.title),
            normalize_key(self.primary_artist().unwrap_or_default())
        )
    }
}

// ============================================================================
// Catalog search response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackPage {
    /// The catalog occasionally returns null entries
    #[serde(default)]
    pub items: Vec<Option<RawTrack>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    pub album: Option<RawAlbum>,
    pub preview_url: Option<String>,
    pub external_urls: Option<ExternalUrls>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawArtist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawAlbum {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<AlbumImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExternalUrls {
    pub spotify: Option<String>,
}

impl RawTrack {
    /// Map into a `Track`; entries without an id or title are dropped
    pub(crate) fn into_track(self) -> Option<Track> {
        let id = self.id.filter(|id| !id.is_empty())?;
        if self.name.trim().is_empty() {
            return None;
        }

        let artists = self
            .artists
            .into_iter()
            .map(|a| TrackArtist {
                id: a.id.unwrap_or_default(),
                name: a.name,
            })
            .collect();

        let album = self
            .album
            .map(|a| Album {
                id: a.id.unwrap_or_default(),
                name: a.name,
                images: a.images,
            })
            .unwrap_or_default();

        Some(Track {
            id,
            title: self.name,
            artists,
            album,
            preview_url: self.preview_url.filter(|url| !url.trim().is_empty()),
            external_url: self
                .external_urls
                .and_then(|u| u.spotify)
                .unwrap_or_default(),
            duration_ms: self.duration_ms,
            popularity: self.popularity,
        })
    }
}
