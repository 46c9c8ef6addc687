//! Live video search and matcher fallback tests against a wiremock video API

use moodtunes_common::config::RelevanceWeights;
use moodtunes_resolver::video::{
    LiveVideoSearch, StaticVideoCatalog, VideoMatcher, VideoMode, VideoOutcome, VideoSearchError,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live(server: &MockServer) -> LiveVideoSearch {
    LiveVideoSearch::new(
        reqwest::Client::new(),
        server.uri(),
        "test-key",
        5,
        100,
        RelevanceWeights::default(),
    )
}

fn search_item(id: &str, title: &str, channel: &str) -> serde_json::Value {
    json!({
        "id": {"kind": "youtube#video", "videoId": id},
        "snippet": {
            "title": title,
            "channelTitle": channel,
            "thumbnails": {"high": {"url": format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id)}}
        }
    })
}

fn video_item(id: &str, duration: &str, views: &str, embeddable: bool) -> serde_json::Value {
    json!({
        "id": id,
        "contentDetails": {"duration": duration},
        "statistics": {"viewCount": views},
        "status": {"embeddable": embeddable}
    })
}

async fn mount_search(server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("key", "test-key"))
        .and(query_param("videoEmbeddable", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .mount(server)
        .await;
}

async fn mount_videos(server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("part", "contentDetails,statistics,status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_highest_scoring_embeddable_wins() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        vec![
            search_item("cover1", "Believer (acoustic cover)", "Random Covers"),
            search_item(
                "official",
                "Imagine Dragons - Believer (Official Music Video)",
                "ImagineDragonsVEVO",
            ),
            search_item("official", "duplicate hit", "ImagineDragonsVEVO"),
        ],
    )
    .await;
    mount_videos(
        &server,
        vec![
            video_item("cover1", "PT3M30S", "1000", true),
            video_item("official", "PT3M37S", "2000000000", true),
        ],
    )
    .await;

    let outcome = live(&server).search("Believer", "Imagine Dragons").await.unwrap();

    match outcome {
        VideoOutcome::Found(video) => {
            assert_eq!(video.video_id, "official");
            assert_eq!(video.duration, "3:37");
            assert_eq!(video.embed_url, "https://www.youtube.com/embed/official");
            assert_eq!(video.channel_title, "ImagineDragonsVEVO");
            assert!(video.relevance_score.unwrap() > 40);
        }
        other => panic!("expected a match, got {:?}", other),
    }
}

async fn mount_query(server: &MockServer, query: &str, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_hits_merged_across_queries_and_deduped_by_id() {
    let server = MockServer::start().await;
    mount_query(
        &server,
        "\"Believer\" \"Imagine Dragons\" official video",
        vec![
            search_item("lyrics", "Believer (Lyrics)", "Lyric Channel"),
            search_item(
                "official",
                "Imagine Dragons - Believer (Official Music Video)",
                "ImagineDragonsVEVO",
            ),
        ],
    )
    .await;
    mount_query(
        &server,
        "Believer Imagine Dragons official music video",
        vec![
            search_item(
                "official",
                "Imagine Dragons - Believer (Official Music Video)",
                "ImagineDragonsVEVO",
            ),
            search_item("live", "Believer live", "Fan Uploads"),
        ],
    )
    .await;
    mount_query(&server, "Believer Imagine Dragons", vec![]).await;

    // One batched details call carrying each id once, in first-seen order
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "lyrics,official,live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [
            video_item("lyrics", "PT3M30S", "500", true),
            video_item("official", "PT3M37S", "2000000000", true),
            video_item("live", "PT5M02S", "900", true),
        ]})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = live(&server).search("Believer", "Imagine Dragons").await.unwrap();

    match outcome {
        VideoOutcome::Found(video) => assert_eq!(video.video_id, "official"),
        other => panic!("expected a match, got {:?}", other),
    }
}

#[tokio::test]
async fn test_no_embeddable_candidate_returns_search_link() {
    let server = MockServer::start().await;
    mount_search(&server, vec![search_item("blocked", "Believer", "Imagine Dragons")]).await;
    mount_videos(&server, vec![video_item("blocked", "PT3M37S", "10", false)]).await;

    let outcome = live(&server).search("Believer", "Imagine Dragons").await.unwrap();

    match outcome {
        VideoOutcome::SearchOnly { link } => {
            assert!(link.starts_with("https://www.youtube.com/results?search_query="));
            assert!(link.contains("Believer"));
        }
        other => panic!("expected search link, got {:?}", other),
    }
}

#[tokio::test]
async fn test_all_queries_empty_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = live(&server).search("Unknown Song", "Unknown Artist").await.unwrap();
    assert_eq!(outcome, VideoOutcome::NotFound);
}

#[tokio::test]
async fn test_quota_exhaustion_is_an_error_for_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "errors": [{"reason": "quotaExceeded"}]}
        })))
        .mount(&server)
        .await;

    let err = live(&server).search("Believer", "Imagine Dragons").await.unwrap_err();
    assert!(matches!(err, VideoSearchError::QuotaOrPermission(403)));
}

#[tokio::test]
async fn test_matcher_falls_back_to_static_on_quota() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let matcher = VideoMatcher::new(
        Arc::new(StaticVideoCatalog::builtin()),
        Some(Arc::new(live(&server))),
    );
    assert_eq!(matcher.mode(), VideoMode::Live);

    match matcher.match_video("Blinding Lights", "The Weeknd").await {
        VideoOutcome::Found(video) => assert_eq!(video.video_id, "4NRXx6U8ABQ"),
        other => panic!("expected static match, got {:?}", other),
    }

    assert_eq!(
        matcher.match_video("Nothing Here", "Nobody Known").await,
        VideoOutcome::NotFound
    );
}

#[tokio::test]
async fn test_matcher_skips_live_search_for_empty_input() {
    let server = MockServer::start().await;
    let matcher = VideoMatcher::new(
        Arc::new(StaticVideoCatalog::builtin()),
        Some(Arc::new(live(&server))),
    );

    assert_eq!(matcher.match_video("", "The Weeknd").await, VideoOutcome::NotFound);
    assert!(server.received_requests().await.unwrap().is_empty());
}
