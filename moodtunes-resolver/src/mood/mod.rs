//! Mood parameter mapping
//!
//! Turns a mood label plus intensity into numeric audio-feature targets and a
//! genre list. Pure and infallible: unknown labels fall back to the default mood.
//!
//! Resolution per feature:
//! 1. Linear interpolation across the mood's range by `intensity / 100`
//! 2. Extremity push: values above 0.5 move toward 1, others toward 0, by a
//!    fraction proportional to intensity
//! 3. Clamp to `[0, 1]`

pub mod profiles;

pub use profiles::{FeatureRange, MoodProfile, MoodTable};

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fraction of the remaining distance to the extreme applied at full intensity
const EXTREMITY_PUSH: f64 = 0.3;

/// Intensity used when the caller sends a non-finite value
const DEFAULT_INTENSITY: f64 = 50.0;

/// Genre used if a profile somehow has none
const FALLBACK_GENRE: &str = "pop";

static KNOWN_MOODS: [MoodId; 10] = [
    MoodId::Euphoric,
    MoodId::Happy,
    MoodId::Energetic,
    MoodId::Serene,
    MoodId::Melancholic,
    MoodId::Nostalgic,
    MoodId::Romantic,
    MoodId::Angry,
    MoodId::Anxious,
    MoodId::Focused,
];

/// Known mood identifiers plus an explicit unknown variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MoodId {
    Euphoric,
    Happy,
    Energetic,
    Serene,
    Melancholic,
    Nostalgic,
    Romantic,
    Angry,
    Anxious,
    Focused,
    /// Label with no profile (normalized form of what the caller sent)
    Unknown(String),
}

impl MoodId {
    /// Every known mood, in display order
    pub fn known() -> &'static [MoodId] {
        &KNOWN_MOODS
    }

    /// Mood substituted for unknown labels
    pub const DEFAULT: MoodId = MoodId::Happy;

    /// Case- and whitespace-insensitive parse; never fails
    pub fn parse(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        MoodId::known()
            .iter()
            .find(|id| id.label() == normalized)
            .cloned()
            .unwrap_or(MoodId::Unknown(normalized))
    }

    pub fn label(&self) -> &str {
        match self {
            MoodId::Euphoric => "euphoric",
            MoodId::Happy => "happy",
            MoodId::Energetic => "energetic",
            MoodId::Serene => "serene",
            MoodId::Melancholic => "melancholic",
            MoodId::Nostalgic => "nostalgic",
            MoodId::Romantic => "romantic",
            MoodId::Angry => "angry",
            MoodId::Anxious => "anxious",
            MoodId::Focused => "focused",
            MoodId::Unknown(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MoodId::Unknown(_))
    }
}

impl fmt::Display for MoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MoodId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// User's mood choice as received from the route layer
#[derive(Debug, Clone, Deserialize)]
pub struct MoodSelection {
    pub primary: String,
    /// Nominally 0-100; not guaranteed bounded
    #[serde(default = "default_intensity")]
    pub intensity: f64,
}

fn default_intensity() -> f64 {
    DEFAULT_INTENSITY
}

impl MoodSelection {
    pub fn new(primary: impl Into<String>, intensity: f64) -> Self {
        Self {
            primary: primary.into(),
            intensity,
        }
    }
}

/// Numeric targets used to bias catalog search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTargetParams {
    /// Mood the targets were derived from (after fallback)
    pub mood: MoodId,
    /// Intensity after boundary normalization
    pub intensity: f64,
    pub valence: f64,
    pub energy: f64,
    pub danceability: f64,
    /// Never empty
    pub genres: Vec<String>,
    pub limit: usize,
}

/// Mapper output with the fallback signal and a display description
#[derive(Debug, Clone)]
pub struct MoodResolution {
    pub params: AudioTargetParams,
    /// The requested label was unknown and the default mood was used
    pub fallback_used: bool,
    pub description: String,
}

/// Maps mood selections to audio targets
#[derive(Debug, Clone)]
pub struct MoodMapper {
    table: Arc<MoodTable>,
    default_limit: usize,
}

impl MoodMapper {
    pub fn new(table: Arc<MoodTable>, default_limit: usize) -> Self {
        Self {
            table,
            default_limit,
        }
    }

    pub fn table(&self) -> &MoodTable {
        &self.table
    }

    /// Map a selection to audio targets
    pub fn map(&self, selection: &MoodSelection) -> AudioTargetParams {
        self.resolve(selection).params
    }

    /// Map a selection, also reporting fallback use and a description
    pub fn resolve(&self, selection: &MoodSelection) -> MoodResolution {
        let requested = MoodId::parse(&selection.primary);
        let intensity = normalize_intensity(selection.intensity);

        let (mood, profile, fallback_used) = match self.table.get(&requested) {
            Some(profile) => (requested, profile.clone(), false),
            None => {
                warn!(
                    requested = %requested,
                    fallback = %MoodId::DEFAULT,
                    "Unknown mood label, using default mood"
                );
                let profile = self
                    .table
                    .get(&MoodId::DEFAULT)
                    .cloned()
                    .unwrap_or_else(neutral_profile);
                (MoodId::DEFAULT, profile, true)
            }
        };

        let params = AudioTargetParams {
            valence: feature_target(profile.valence, intensity),
            energy: feature_target(profile.energy, intensity),
            danceability: feature_target(profile.danceability, intensity),
            genres: select_genres(&profile.genres, intensity),
            limit: self.default_limit,
            intensity,
            mood,
        };

        debug!(
            mood = %params.mood,
            intensity = params.intensity,
            valence = params.valence,
            energy = params.energy,
            danceability = params.danceability,
            genres = ?params.genres,
            "Mapped mood to audio targets"
        );

        let description = describe(&params.mood, intensity, &profile.description);

        MoodResolution {
            params,
            fallback_used,
            description,
        }
    }
}

/// Bring caller intensity into `[0, 100]`
///
/// Out-of-range values are clamped rather than extrapolated; non-finite values
/// become the midpoint.
pub fn normalize_intensity(raw: f64) -> f64 {
    if !raw.is_finite() {
        debug!(raw, "Non-finite intensity, using default");
        return DEFAULT_INTENSITY;
    }
    let clamped = raw.clamp(0.0, 100.0);
    if clamped != raw {
        debug!(raw, clamped, "Intensity clamped to 0-100");
    }
    clamped
}

/// Interpolate within the range, push toward the nearer extreme, clamp
pub fn feature_target(range: FeatureRange, intensity: f64) -> f64 {
    let t = intensity / 100.0;
    let base = range.min + (range.max - range.min) * t;

    let pushed = if base > 0.5 {
        base + (1.0 - base) * t * EXTREMITY_PUSH
    } else {
        base - base * t * EXTREMITY_PUSH
    };

    pushed.clamp(0.0, 1.0)
}

/// Narrow the genre list as intensity rises
///
/// `> 70` keeps the two most specific, `40..=70` keeps three, `< 40` keeps all.
pub fn select_genres(genres: &[String], intensity: f64) -> Vec<String> {
    let keep = if intensity > 70.0 {
        2
    } else if intensity >= 40.0 {
        3
    } else {
        genres.len()
    };

    let selected: Vec<String> = genres.iter().take(keep).cloned().collect();
    if selected.is_empty() {
        vec![FALLBACK_GENRE.to_string()]
    } else {
        selected
    }
}

fn describe(mood: &MoodId, intensity: f64, blurb: &str) -> String {
    let degree = if intensity > 70.0 {
        "Intensely"
    } else if intensity >= 40.0 {
        "Moderately"
    } else {
        "Gently"
    };
    format!("{} {}. {}.", degree, mood, blurb)
}

fn neutral_profile() -> MoodProfile {
    MoodProfile {
        valence: FeatureRange::new(0.4, 0.6),
        energy: FeatureRange::new(0.4, 0.6),
        danceability: FeatureRange::new(0.4, 0.6),
        genres: vec![FALLBACK_GENRE.to_string()],
        description: "A bit of everything".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> MoodMapper {
        MoodMapper::new(Arc::new(MoodTable::builtin()), 20)
    }

    fn map(label: &str, intensity: f64) -> AudioTargetParams {
        mapper().map(&MoodSelection::new(label, intensity))
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(MoodId::parse("Serene"), MoodId::Serene);
        assert_eq!(MoodId::parse("  ENERGETIC "), MoodId::Energetic);
        assert_eq!(
            MoodId::parse("Bored"),
            MoodId::Unknown("bored".to_string())
        );
    }

    #[test]
    fn test_features_stay_in_unit_interval() {
        for mood in MoodId::known() {
            for intensity in 0..=100 {
                let p = map(mood.label(), intensity as f64);
                for value in [p.valence, p.energy, p.danceability] {
                    assert!(
                        (0.0..=1.0).contains(&value),
                        "{} at {} produced {}",
                        mood,
                        intensity,
                        value
                    );
                }
            }
        }
    }

    #[test]
    fn test_serene_energy_rises_with_intensity() {
        let low = map("serene", 0.0);
        let high = map("serene", 100.0);
        assert!(high.energy > low.energy);
        assert!(high.valence > low.valence);
    }

    #[test]
    fn test_energetic_high_intensity() {
        let p = map("energetic", 90.0);
        assert!(p.energy > 0.8, "energy was {}", p.energy);
        assert!(p.genres.len() <= 2);
    }

    #[test]
    fn test_unknown_label_matches_default() {
        let m = mapper();
        for intensity in [0.0, 25.0, 40.0, 55.0, 70.0, 71.0, 100.0] {
            let unknown = m.resolve(&MoodSelection::new("flibbertigibbet", intensity));
            let default = m.resolve(&MoodSelection::new(MoodId::DEFAULT.label(), intensity));
            assert!(unknown.fallback_used);
            assert!(!default.fallback_used);
            assert_eq!(unknown.params, default.params);
        }
    }

    #[test]
    fn test_fallback_is_idempotent() {
        let m = mapper();
        let once = m.map(&MoodSelection::new("nope", 60.0));
        let twice = m.map(&MoodSelection::new(once.mood.label(), 60.0));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_genre_narrowing() {
        let genres: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        assert_eq!(select_genres(&genres, 100.0), vec!["a", "b"]);
        assert_eq!(select_genres(&genres, 70.5), vec!["a", "b"]);
        assert_eq!(select_genres(&genres, 70.0), vec!["a", "b", "c"]);
        assert_eq!(select_genres(&genres, 40.0), vec!["a", "b", "c"]);
        assert_eq!(select_genres(&genres, 39.9).len(), 5);
        assert_eq!(select_genres(&[], 10.0), vec![FALLBACK_GENRE]);
    }

    #[test]
    fn test_feature_target_shape() {
        let range = FeatureRange::new(0.2, 0.8);
        // Zero intensity: no interpolation, no push
        assert!((feature_target(range, 0.0) - 0.2).abs() < 1e-9);
        // Full intensity above 0.5: 0.8 + 0.2 * 0.3
        assert!((feature_target(range, 100.0) - 0.86).abs() < 1e-9);
        // Midpoint lands on 0.5 exactly, pushed toward 0: 0.5 - 0.5 * 0.5 * 0.3
        assert!((feature_target(range, 50.0) - 0.425).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_intensity_is_clamped() {
        assert_eq!(map("happy", 250.0), map("happy", 100.0));
        assert_eq!(map("happy", -40.0), map("happy", 0.0));
        assert_eq!(map("happy", f64::NAN), map("happy", 50.0));
        assert_eq!(normalize_intensity(f64::INFINITY), 50.0);
    }

    #[test]
    fn test_limit_comes_from_mapper() {
        let m = MoodMapper::new(Arc::new(MoodTable::builtin()), 7);
        assert_eq!(m.map(&MoodSelection::new("angry", 50.0)).limit, 7);
    }

    #[test]
    fn test_empty_table_uses_neutral_profile() {
        let m = MoodMapper::new(Arc::new(MoodTable::from_profiles(Vec::new())), 10);
        let resolution = m.resolve(&MoodSelection::new("serene", 50.0));
        assert!(resolution.fallback_used);
        assert_eq!(resolution.params.mood, MoodId::DEFAULT);
        assert_eq!(resolution.params.genres, vec![FALLBACK_GENRE]);
    }

    #[test]
    fn test_description_mentions_mood() {
        let resolution = mapper().resolve(&MoodSelection::new("serene", 90.0));
        assert!(resolution.description.starts_with("Intensely serene."));
    }

    #[test]
    fn test_params_serialize_camel_case() {
        let json = serde_json::to_value(map("focused", 30.0)).unwrap();
        assert_eq!(json["mood"], "focused");
        assert!(json.get("danceability").is_some());
        assert!(json["genres"].is_array());
    }
}
