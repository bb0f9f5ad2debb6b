//! Integration tests for `MetadataAdapter` pagination and batching against a
//! wiremock-backed `YoutubeClient`.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytdash_youtube::{ChannelLookup, MetadataAdapter, YoutubeClient, YoutubeError};

fn test_client(base_url: &str) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 30, "ytdash-test/0.1", base_url)
        .expect("client construction should not fail")
}

fn playlist_page(ids: &[&str], next: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({ "contentDetails": { "videoId": id } }))
        .collect();
    match next {
        Some(token) => json!({ "items": items, "nextPageToken": token }),
        None => json!({ "items": items }),
    }
}

fn video(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "snippet": { "title": format!("Video {id}"), "publishedAt": "2025-02-01T12:00:00Z" },
        "statistics": { "viewCount": "10", "likeCount": "1", "commentCount": "0" },
        "contentDetails": { "duration": "PT1M" }
    })
}

// ---------------------------------------------------------------------------
// fetch_channel_summary
// ---------------------------------------------------------------------------

#[tokio::test]
async fn channel_summary_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UC1",
                "snippet": { "title": "Chan" },
                "statistics": { "subscriberCount": "5", "viewCount": "50", "videoCount": "2" },
                "contentDetails": { "relatedPlaylists": { "uploads": "UU1" } }
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let lookup = adapter.fetch_channel_summary("UC1").await;

    let ChannelLookup::Found(summary) = lookup else {
        panic!("expected Found, got {lookup:?}");
    };
    assert_eq!(summary.uploads_playlist_id, "UU1");
    assert_eq!(adapter.provider_calls(), 1);
}

#[tokio::test]
async fn channel_summary_not_found_is_distinct_from_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UCmissing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UCbroken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);

    assert_eq!(
        adapter.fetch_channel_summary("UCmissing").await,
        ChannelLookup::NotFound
    );
    let failed = adapter.fetch_channel_summary("UCbroken").await;
    assert!(matches!(failed, ChannelLookup::Failed(ref r) if r.contains("500")));
    assert!(failed.reason().is_some());
}

#[tokio::test]
async fn unconfigured_adapter_fails_without_calls() {
    let adapter = MetadataAdapter::<YoutubeClient>::unconfigured();
    assert!(!adapter.is_configured());

    let lookup = adapter.fetch_channel_summary("UC1").await;
    assert!(matches!(lookup, ChannelLookup::Failed(ref r) if r.contains("not configured")));

    let err = adapter.list_uploaded_video_ids("UU1", 10).await.unwrap_err();
    assert!(matches!(err, YoutubeError::NotConfigured));
    assert_eq!(adapter.provider_calls(), 0);
}

// ---------------------------------------------------------------------------
// list_uploaded_video_ids
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pagination_follows_tokens_until_absent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "P2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["c"], None)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UU1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["a", "b"], Some("P2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter
        .list_uploaded_video_ids("UU1", 500)
        .await
        .expect("listing succeeds");

    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(adapter.provider_calls(), 2);
}

#[tokio::test]
async fn pagination_stops_at_max_results() {
    let server = MockServer::start().await;

    // Both pages advertise another page; only max_results can stop the loop.
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "P2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["d", "e", "f"], Some("P3"))),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["a", "b", "c"], Some("P2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter.list_uploaded_video_ids("UU1", 5).await.unwrap();

    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(adapter.provider_calls(), 2);
}

#[tokio::test]
async fn pagination_drops_items_repeated_across_pages() {
    let server = MockServer::start().await;

    // A new upload between fetches pushes "b" from page 1 onto page 2.
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "P2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["b", "c"], None)))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["a", "b"], Some("P2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter.list_uploaded_video_ids("UU1", 500).await.unwrap();

    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn pagination_counts_max_results_after_dropping_repeats() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "P2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["b", "c", "d"], None)),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["a", "b"], Some("P2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter.list_uploaded_video_ids("UU1", 3).await.unwrap();

    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn pagination_stops_when_a_page_repeats_entirely() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["a", "b"], Some("again"))),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter.list_uploaded_video_ids("UU1", 100).await.unwrap();

    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(adapter.provider_calls(), 2);
}

#[tokio::test]
async fn pagination_stops_on_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&[], Some("loop"))))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter.list_uploaded_video_ids("UU1", 100).await.unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn zero_max_results_issues_no_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(&["a"], None)))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let ids = adapter.list_uploaded_video_ids("UU1", 0).await.unwrap();
    assert!(ids.is_empty());
    assert_eq!(adapter.provider_calls(), 0);
}

// ---------------------------------------------------------------------------
// fetch_video_details
// ---------------------------------------------------------------------------

#[tokio::test]
async fn details_are_fetched_in_batches_of_fifty_in_order() {
    let server = MockServer::start().await;
    let ids: Vec<String> = (0..120).map(|i| format!("v{i}")).collect();

    for (batch_no, batch) in ids.chunks(50).enumerate() {
        let marker = format!("batch-{batch_no}");
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", batch.join(",").as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "items": [video(&marker)] })),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let details = adapter.fetch_video_details(&ids).await.unwrap();

    let got: Vec<&str> = details.iter().map(|d| d.video_id.as_str()).collect();
    assert_eq!(got, vec!["batch-0", "batch-1", "batch-2"]);
    assert_eq!(adapter.provider_calls(), 3);
}

#[tokio::test]
async fn details_skip_videos_without_publish_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                video("ok"),
                { "id": "bad", "snippet": { "title": "No date" } }
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let details = adapter
        .fetch_video_details(&["ok".to_string(), "bad".to_string()])
        .await
        .unwrap();

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].video_id, "ok");
    assert_eq!(details[0].duration_seconds, 60);
}

#[tokio::test]
async fn empty_id_list_issues_no_detail_calls() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());
    let adapter = MetadataAdapter::new(&client);
    let details = adapter.fetch_video_details(&[]).await.unwrap();
    assert!(details.is_empty());
    assert_eq!(adapter.provider_calls(), 0);
}
