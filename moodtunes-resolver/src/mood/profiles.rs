//! Mood → audio feature profile table
//!
//! Each known mood maps to min/max ranges for valence, energy and danceability
//! plus an ordered genre list, most specific first. The table is built once and
//! shared read-only.

use super::MoodId;
use std::collections::HashMap;

/// Closed interval of an audio feature, both ends in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Static record for one mood
#[derive(Debug, Clone, PartialEq)]
pub struct MoodProfile {
    pub valence: FeatureRange,
    pub energy: FeatureRange,
    pub danceability: FeatureRange,
    /// Most specific first
    pub genres: Vec<String>,
    /// One-line description shown with the results
    pub description: String,
}

/// Immutable mood table keyed by known mood
#[derive(Debug, Clone)]
pub struct MoodTable {
    profiles: HashMap<MoodId, MoodProfile>,
}

impl Default for MoodTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MoodTable {
    /// Built-in profiles for every known mood
    pub fn builtin() -> Self {
        Self {
            profiles: Self::build_profiles(),
        }
    }

    /// Build a table from explicit profiles (unknown ids are ignored)
    pub fn from_profiles(profiles: impl IntoIterator<Item = (MoodId, MoodProfile)>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .filter(|(id, _)| id.is_known())
                .collect(),
        }
    }

    pub fn get(&self, mood: &MoodId) -> Option<&MoodProfile> {
        self.profiles.get(mood)
    }

    pub fn contains(&self, mood: &MoodId) -> bool {
        self.profiles.contains_key(mood)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Known moods in declaration order, with their profiles
    pub fn iter(&self) -> impl Iterator<Item = (&MoodId, &MoodProfile)> {
        MoodId::known()
            .iter()
            .filter_map(move |id| self.profiles.get(id).map(|p| (id, p)))
    }

    fn build_profiles() -> HashMap<MoodId, MoodProfile> {
        let mut map = HashMap::new();

        map.insert(
            MoodId::Euphoric,
            Self::build_profile(
                (0.75, 0.98),
                (0.75, 0.98),
                (0.65, 0.90),
                &["edm", "dance", "house", "pop", "electro"],
                "Soaring, hands-in-the-air highs",
            ),
        );

        map.insert(
            MoodId::Happy,
            Self::build_profile(
                (0.65, 0.95),
                (0.50, 0.80),
                (0.55, 0.85),
                &["pop", "dance", "funk", "soul", "indie-pop"],
                "Bright, sunny and easy to smile along to",
            ),
        );

        map.insert(
            MoodId::Energetic,
            Self::build_profile(
                (0.45, 0.80),
                (0.70, 0.95),
                (0.55, 0.85),
                &["work-out", "edm", "rock", "hip-hop", "electronic"],
                "Driving beats to keep you moving",
            ),
        );

        map.insert(
            MoodId::Serene,
            Self::build_profile(
                (0.50, 0.75),
                (0.10, 0.35),
                (0.20, 0.45),
                &["ambient", "chill", "acoustic", "classical", "new-age"],
                "Calm, unhurried and spacious",
            ),
        );

        map.insert(
            MoodId::Melancholic,
            Self::build_profile(
                (0.05, 0.30),
                (0.15, 0.45),
                (0.15, 0.45),
                &["sad", "indie", "singer-songwriter", "piano", "folk"],
                "Wistful songs for heavy hearts",
            ),
        );

        map.insert(
            MoodId::Nostalgic,
            Self::build_profile(
                (0.35, 0.65),
                (0.30, 0.60),
                (0.35, 0.65),
                &["soul", "rock", "folk", "blues", "disco"],
                "Warm echoes of another time",
            ),
        );

        map.insert(
            MoodId::Romantic,
            Self::build_profile(
                (0.45, 0.75),
                (0.25, 0.55),
                (0.35, 0.65),
                &["r-n-b", "soul", "jazz", "acoustic", "pop"],
                "Slow, tender and close",
            ),
        );

        map.insert(
            MoodId::Angry,
            Self::build_profile(
                (0.05, 0.30),
                (0.75, 0.98),
                (0.35, 0.60),
                &["metal", "hard-rock", "punk", "hip-hop", "industrial"],
                "Loud, heavy and cathartic",
            ),
        );

        map.insert(
            MoodId::Anxious,
            Self::build_profile(
                (0.15, 0.40),
                (0.45, 0.75),
                (0.25, 0.50),
                &["trip-hop", "alternative", "electronic", "indie", "post-rock"],
                "Restless tension with somewhere to put it",
            ),
        );

        map.insert(
            MoodId::Focused,
            Self::build_profile(
                (0.30, 0.60),
                (0.25, 0.50),
                (0.25, 0.50),
                &["study", "ambient", "classical", "piano", "electronic"],
                "Steady background for deep work",
            ),
        );

        map
    }

    fn build_profile(
        valence: (f64, f64),
        energy: (f64, f64),
        danceability: (f64, f64),
        genres: &[&str],
        description: &str,
    ) -> MoodProfile {
        MoodProfile {
            valence: FeatureRange::new(valence.0, valence.1),
            energy: FeatureRange::new(energy.0, energy.1),
            danceability: FeatureRange::new(danceability.0, danceability.1),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_known_mood() {
        let table = MoodTable::builtin();
        assert_eq!(table.len(), MoodId::known().len());
        for mood in MoodId::known() {
            assert!(table.contains(mood), "missing profile for {}", mood);
        }
    }

    #[test]
    fn test_ranges_are_well_formed() {
        let table = MoodTable::builtin();
        for (mood, profile) in table.iter() {
            for range in [profile.valence, profile.energy, profile.danceability] {
                assert!(range.min >= 0.0 && range.max <= 1.0, "{} out of bounds", mood);
                assert!(range.min <= range.max, "{} range inverted", mood);
            }
            assert!(!profile.genres.is_empty(), "{} has no genres", mood);
            assert!(!profile.description.is_empty());
        }
    }

    #[test]
    fn test_iter_follows_declaration_order() {
        let table = MoodTable::builtin();
        let order: Vec<&MoodId> = table.iter().map(|(id, _)| id).collect();
        let expected: Vec<&MoodId> = MoodId::known().iter().collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_from_profiles_drops_unknown_ids() {
        let profile = MoodTable::builtin().get(&MoodId::Happy).cloned().unwrap();
        let table = MoodTable::from_profiles(vec![
            (MoodId::Happy, profile.clone()),
            (MoodId::Unknown("bored".to_string()), profile),
        ]);
        assert_eq!(table.len(), 1);
    }
}
