//! HTTP-level tests for the search client and candidate fetcher
//!
//! A local mock server stands in for the Custom Search API and for image
//! hosts, verifying the wire parameters, response mapping, and the
//! fetcher's rejection behavior.

use imgscout::{
    evaluate_candidate, AcceptanceCriteria, CandidateFetcher, Credentials, Evaluation,
    GoogleCustomSearch, HttpFetcher, ImageSearchProvider, RejectReason, SearchQuery,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> GoogleCustomSearch {
    GoogleCustomSearch::new(Credentials::new("test-key", "test-cx"))
        .unwrap()
        .with_endpoint(format!("{}/customsearch/v1", server.uri()))
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn search_sends_credentials_and_maps_candidates_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "test-key"))
        .and(query_param("cx", "test-cx"))
        .and(query_param("q", "mountain sunrise"))
        .and(query_param("searchType", "image"))
        .and(query_param("num", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "link": "https://img.example/first.jpg",
                    "mime": "image/jpeg",
                    "image": {"width": 2560, "height": 1440}
                },
                {"link": "https://img.example/second.png"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let candidates = provider
        .search(&SearchQuery::new("mountain sunrise"), 2)
        .await
        .unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].url, "https://img.example/first.jpg");
    assert_eq!(candidates[0].declared_size, Some((2560, 1440)));
    assert_eq!(candidates[1].url, "https://img.example/second.png");
}

#[tokio::test]
async fn search_clamps_over_requested_count_to_page_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    // 2x over-request for 8 results exceeds the page cap
    let candidates = provider.search(&SearchQuery::new("q"), 16).await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn search_surfaces_provider_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Quota exceeded for quota metric"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .search(&SearchQuery::new("q"), 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Quota exceeded"));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn search_without_items_yields_no_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchInformation": {"totalResults": "0"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let candidates = provider.search(&SearchQuery::new("q"), 5).await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn fetcher_normalizes_declared_content_type() {
    let server = MockServer::start().await;
    let body = png_bytes(8, 8);
    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.clone(), "IMAGE/PNG; charset=binary"),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let fetched = fetcher
        .fetch(&format!("{}/img.png", server.uri()))
        .await
        .unwrap();

    assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
    assert_eq!(fetched.bytes, body);
}

#[tokio::test]
async fn fetcher_rejects_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let url = format!("{}/gone.jpg", server.uri());
    assert!(fetcher.fetch(&url).await.is_err());

    // Through the evaluator the same failure is a per-candidate rejection,
    // never an error
    let result = evaluate_candidate(&fetcher, &url, &AcceptanceCriteria::none()).await;
    assert!(matches!(
        result,
        Evaluation::Rejected(RejectReason::Transport(_))
    ));
}

#[tokio::test]
async fn evaluation_over_http_checks_real_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png_bytes(50, 40), "image/png"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let url = format!("{}/photo.png", server.uri());

    let criteria = AcceptanceCriteria::min_resolution(40, 40);
    let accepted = evaluate_candidate(&fetcher, &url, &criteria);
    assert!(accepted.await.is_accepted());

    let rejected =
        evaluate_candidate(&fetcher, &url, &AcceptanceCriteria::min_resolution(60, 1)).await;
    assert!(matches!(
        rejected,
        Evaluation::Rejected(RejectReason::TooSmall { width: 50, .. })
    ));
}
