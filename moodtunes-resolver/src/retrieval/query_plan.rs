//! Catalog query planning
//!
//! Audio targets are sorted into one of five coarse buckets. Each bucket names
//! artists whose catalog entries reliably carry preview clips, and a few
//! well-known songs used when the first pass comes up short.

use crate::mood::AudioTargetParams;

/// Primary queries issued per retrieval
pub const MAX_PRIMARY_QUERIES: usize = 3;

/// Genres used for date-range fallback queries
const MAX_FALLBACK_GENRES: usize = 3;

/// Release window for genre fallback queries
const FALLBACK_YEAR_RANGE: &str = "2010-2025";

/// Coarse classification of audio targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodBucket {
    /// High valence and high energy
    Uplifting,
    LowValence,
    LowEnergy,
    HighEnergy,
    Default,
}

impl MoodBucket {
    /// First matching rule wins
    pub fn classify(params: &AudioTargetParams) -> Self {
        if params.valence > 0.6 && params.energy > 0.6 {
            MoodBucket::Uplifting
        } else if params.valence < 0.4 {
            MoodBucket::LowValence
        } else if params.energy < 0.4 {
            MoodBucket::LowEnergy
        } else if params.energy > 0.7 {
            MoodBucket::HighEnergy
        } else {
            MoodBucket::Default
        }
    }

    /// Artists with dependable preview availability
    fn preview_artists(self) -> &'static [&'static str] {
        match self {
            MoodBucket::Uplifting => &["Dua Lipa", "Bruno Mars", "Pharrell Williams"],
            MoodBucket::LowValence => &["Billie Eilish", "Lana Del Rey", "Radiohead"],
            MoodBucket::LowEnergy => &["Norah Jones", "Bon Iver", "Ludovico Einaudi"],
            MoodBucket::HighEnergy => &["Imagine Dragons", "The Prodigy", "Calvin Harris"],
            MoodBucket::Default => &["Coldplay", "Ed Sheeran", "Arctic Monkeys"],
        }
    }

    /// (title, artist) pairs that fit the bucket
    fn signature_tracks(self) -> &'static [(&'static str, &'static str)] {
        match self {
            MoodBucket::Uplifting => &[
                ("Uptown Funk", "Mark Ronson"),
                ("Happy", "Pharrell Williams"),
                ("Levitating", "Dua Lipa"),
            ],
            MoodBucket::LowValence => &[
                ("Someone Like You", "Adele"),
                ("Fix You", "Coldplay"),
                ("when the party's over", "Billie Eilish"),
            ],
            MoodBucket::LowEnergy => &[
                ("Holocene", "Bon Iver"),
                ("Don't Know Why", "Norah Jones"),
                ("Nuvole Bianche", "Ludovico Einaudi"),
            ],
            MoodBucket::HighEnergy => &[
                ("Blinding Lights", "The Weeknd"),
                ("Believer", "Imagine Dragons"),
                ("Titanium", "David Guetta"),
            ],
            MoodBucket::Default => &[
                ("Yellow", "Coldplay"),
                ("Shape of You", "Ed Sheeran"),
                ("Do I Wanna Know?", "Arctic Monkeys"),
            ],
        }
    }
}

/// First-pass queries: one per preview-friendly artist of the bucket
pub fn primary_queries(params: &AudioTargetParams) -> Vec<String> {
    MoodBucket::classify(params)
        .preview_artists()
        .iter()
        .take(MAX_PRIMARY_QUERIES)
        .map(|artist| format!("artist:\"{}\"", artist))
        .collect()
}

/// Broader second-pass queries: recent releases per genre, then signature songs
pub fn fallback_queries(params: &AudioTargetParams) -> Vec<String> {
    let bucket = MoodBucket::classify(params);

    let by_genre = params
        .genres
        .iter()
        .take(MAX_FALLBACK_GENRES)
        .map(|genre| format!("genre:\"{}\" year:{}", genre, FALLBACK_YEAR_RANGE));

    let by_title = bucket
        .signature_tracks()
        .iter()
        .map(|(title, artist)| format!("track:\"{}\" artist:\"{}\"", title, artist));

    by_genre.chain(by_title).collect()
}
