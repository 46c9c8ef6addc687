//! Relevance scoring for live video search candidates

use crate::normalize::normalize_key;
use moodtunes_common::config::RelevanceWeights;

/// The track being matched
#[derive(Debug, Clone, Copy)]
pub struct ScoringTarget<'a> {
    pub track_title: &'a str,
    pub artist: &'a str,
}

/// What the video catalog reported for one candidate
#[derive(Debug, Clone, Copy)]
pub struct CandidateFacts<'a> {
    pub title: &'a str,
    pub channel_title: &'a str,
    pub duration_secs: Option<u64>,
}

/// Sum the weights of every rule the candidate satisfies
///
/// Track and artist containment compare normalized keys; the keyword rules
/// compare lowercased text. Duration bands are cumulative, so a 4 minute video
/// earns both the ideal and the acceptable weight.
pub fn score_candidate(
    weights: &RelevanceWeights,
    target: ScoringTarget<'_>,
    candidate: CandidateFacts<'_>,
) -> i32 {
    let title_key = normalize_key(candidate.title);
    let channel_key = normalize_key(candidate.channel_title);
    let track_key = normalize_key(target.track_title);
    let artist_key = normalize_key(target.artist);

    let title_lower = candidate.title.to_lowercase();
    let channel_lower = candidate.channel_title.to_lowercase();

    let mut score = 0;

    if !track_key.is_empty() && title_key.contains(&track_key) {
        score += weights.title_has_track;
    }
    if !artist_key.is_empty() && title_key.contains(&artist_key) {
        score += weights.title_has_artist;
    }
    if title_lower.contains("official") {
        score += weights.title_official;
    }
    if title_lower.contains("music video") {
        score += weights.title_music_video;
    }
    if title_lower.contains("mv") {
        score += weights.title_mv;
    }

    if !artist_key.is_empty() && channel_key.contains(&artist_key) {
        score += weights.channel_has_artist;
    }
    if channel_lower.contains("official") {
        score += weights.channel_official;
    }
    if channel_lower.contains("vevo") {
        score += weights.channel_vevo;
    }
    if channel_lower.contains("records") {
        score += weights.channel_records;
    }

    if let Some(secs) = candidate.duration_secs {
        if (120..=480).contains(&secs) {
            score += weights.duration_ideal;
        }
        if (60..=600).contains(&secs) {
            score += weights.duration_acceptable;
        }
        if secs > 900 {
            score += weights.duration_too_long;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: ScoringTarget<'static> = ScoringTarget {
        track_title: "Blinding Lights",
        artist: "The Weeknd",
    };

    fn facts<'a>(title: &'a str, channel: &'a str, secs: Option<u64>) -> CandidateFacts<'a> {
        CandidateFacts {
            title,
            channel_title: channel,
            duration_secs: secs,
        }
    }

    #[test]
    fn test_official_video_scores_highest() {
        let weights = RelevanceWeights::default();

        let official = score_candidate(
            &weights,
            TARGET,
            facts(
                "The Weeknd - Blinding Lights (Official Music Video)",
                "TheWeekndVEVO",
                Some(263),
            ),
        );
        // 10 + 10 + 5 + 5 + 8 + 7 + 5 + 2
        assert_eq!(official, 52);

        let cover = score_candidate(
            &weights,
            TARGET,
            facts("Blinding Lights piano cover", "Some Pianist", Some(200)),
        );
        // 10 + 5 + 2
        assert_eq!(cover, 17);
        assert!(official > cover);
    }

    #[test]
    fn test_duration_bands() {
        let weights = RelevanceWeights::default();
        let score = |secs| score_candidate(&weights, TARGET, facts("x", "y", Some(secs)));

        assert_eq!(score(240), 7);
        assert_eq!(score(90), 2);
        assert_eq!(score(700), 0);
        assert_eq!(score(3600), -5);
        assert_eq!(score_candidate(&weights, TARGET, facts("x", "y", None)), 0);
    }

    #[test]
    fn test_mv_keyword_anywhere_in_title() {
        let weights = RelevanceWeights::default();
        assert_eq!(score_candidate(&weights, TARGET, facts("Song [MV]", "c", None)), 3);
        assert_eq!(score_candidate(&weights, TARGET, facts("BelieverMV", "c", None)), 3);
        assert_eq!(score_candidate(&weights, TARGET, facts("Song (audio)", "c", None)), 0);
    }

    #[test]
    fn test_channel_keywords() {
        let weights = RelevanceWeights::default();
        assert_eq!(
            score_candidate(&weights, TARGET, facts("x", "Republic Records Official", None)),
            3 + 2
        );
    }

    #[test]
    fn test_custom_weights_apply() {
        let weights = RelevanceWeights {
            title_has_track: 100,
            ..RelevanceWeights::default()
        };
        assert_eq!(
            score_candidate(&weights, TARGET, facts("blinding lights", "c", None)),
            100
        );
    }
}
