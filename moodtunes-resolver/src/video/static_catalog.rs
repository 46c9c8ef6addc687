//! Static reference catalog of known videos
//!
//! Always available, needs no credentials. Matching runs three tiers in strict
//! order and stops at the first tier with a hit:
//! 1. exact normalized title and artist
//! 2. mutual substring containment on both title and artist
//! 3. substring containment on artist only
//!
//! Within a tier the first entry in catalog order wins.

use super::VideoMatch;
use crate::normalize::normalize_key;
use moodtunes_common::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Built-in entries: (artist, title, video id)
const BUILTIN_ENTRIES: &[(&str, &str, &str)] = &[
    ("The Weeknd", "Blinding Lights", "4NRXx6U8ABQ"),
    ("Rick Astley", "Never Gonna Give You Up", "dQw4w9WgXcQ"),
    ("Luis Fonsi", "Despacito", "kJQP7kiw5Fk"),
    ("Ed Sheeran", "Shape of You", "JGwWNGJdvx8"),
    ("PSY", "Gangnam Style", "9bZkp7q19f0"),
    ("Mark Ronson", "Uptown Funk", "OPf0YbXqDm0"),
    ("Pharrell Williams", "Happy", "ZbZSe6N_BXs"),
    ("Adele", "Hello", "YQHsXMglC9A"),
    ("Queen", "Bohemian Rhapsody", "fJ9rUzIMcZQ"),
    ("a-ha", "Take On Me", "djV11Xbc914"),
    ("Billie Eilish", "bad guy", "DyDfgMOUjCI"),
    ("Imagine Dragons", "Believer", "7wtfhZwyrcc"),
];

/// One reference video
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub artist: String,
    pub title: String,
    pub video_id: String,
    /// Display duration (`m:ss`), when known
    #[serde(default)]
    pub duration: Option<String>,
}

/// Tier that produced a static match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Substring,
    ArtistOnly,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entry: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    entry: CatalogEntry,
    title_key: String,
    artist_key: String,
}

/// Immutable static video catalog
#[derive(Debug, Clone)]
pub struct StaticVideoCatalog {
    entries: Vec<IndexedEntry>,
}

impl StaticVideoCatalog {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_ENTRIES.iter().map(|(artist, title, id)| CatalogEntry {
            artist: artist.to_string(),
            title: title.to_string(),
            video_id: id.to_string(),
            duration: None,
        }))
    }

    /// Build from entries in priority order
    ///
    /// Entries whose title or artist normalizes to nothing, or with a blank
    /// video id, are skipped: an empty key would contain-match every input.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let title_key = normalize_key(&entry.title);
                let artist_key = normalize_key(&entry.artist);
                if title_key.is_empty()
                    || artist_key.is_empty()
                    || entry.video_id.trim().is_empty()
                {
                    warn!(
                        artist = %entry.artist,
                        title = %entry.title,
                        "Skipping unusable video catalog entry"
                    );
                    return None;
                }
                Some(IndexedEntry {
                    entry,
                    title_key,
                    artist_key,
                })
            })
            .collect();

        Self { entries }
    }

    /// Load a replacement catalog from a TOML file of `[[entry]]` tables
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse video catalog {}: {}", path.display(), e))
        })?;

        let catalog = Self::from_entries(file.entry);
        info!(path = %path.display(), entries = catalog.len(), "Loaded static video catalog");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the best entry for a track, with the tier that matched
    pub fn find(&self, title: &str, artist: &str) -> Option<(&CatalogEntry, MatchTier)> {
        let title_key = normalize_key(title);
        let artist_key = normalize_key(artist);

        if title_key.is_empty() || artist_key.is_empty() {
            return None;
        }

        let mutual = |a: &str, b: &str| a.contains(b) || b.contains(a);

        let tiers: [(MatchTier, &dyn Fn(&IndexedEntry) -> bool); 3] = [
            (MatchTier::Exact, &|e: &IndexedEntry| {
                e.title_key == title_key && e.artist_key == artist_key
            }),
            (MatchTier::Substring, &|e: &IndexedEntry| {
                mutual(&e.title_key, &title_key) && mutual(&e.artist_key, &artist_key)
            }),
            (MatchTier::ArtistOnly, &|e: &IndexedEntry| {
                mutual(&e.artist_key, &artist_key)
            }),
        ];

        let found = tiers.iter().find_map(|(tier, is_hit)| {
            self.entries
                .iter()
                .find(|e| is_hit(e))
                .map(|e| (&e.entry, *tier))
        });

        match &found {
            Some((entry, tier)) => debug!(
                title = %title,
                artist = %artist,
                video_id = %entry.video_id,
                tier = ?tier,
                "Static video catalog match"
            ),
            None => debug!(title = %title, artist = %artist, "No static video catalog match"),
        }

        found
    }

    /// Matched entry as a [`VideoMatch`]
    pub fn lookup(&self, title: &str, artist: &str) -> Option<VideoMatch> {
        self.find(title, artist).map(|(entry, _)| {
            VideoMatch::from_id(
                &entry.video_id,
                format!("{} - {}", entry.artist, entry.title),
                entry.artist.clone(),
                entry.duration.clone().unwrap_or_default(),
            )
        })
    }
}

impl Default for StaticVideoCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
