//! Integration tests for the HTTP fetcher and the catalog wired on top of it.
//!
//! These tests run against a local mock server; no browser is launched.

use std::sync::Arc;

use anime_catalog::render::ChromeRenderer;
use anime_catalog::scraper::{FetchError, Fetcher, Scraper};
use anime_catalog::{Catalog, ScrapeError};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog(server: &MockServer) -> Catalog {
    let scraper = Scraper::new().expect("client builds");
    Catalog::new(
        server.uri(),
        Arc::new(scraper),
        Arc::new(ChromeRenderer::default()),
    )
}

#[tokio::test]
async fn test_fetch_html_returns_body_with_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/popular.html"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let scraper = Scraper::new().expect("client builds");
    let body = scraper
        .fetch_html(&format!("{}/popular.html", mock_server.uri()))
        .await
        .expect("fetch succeeds");

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn test_fetch_html_surfaces_http_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let scraper = Scraper::new().expect("client builds");
    let result = scraper.fetch_html(&mock_server.uri()).await;

    assert!(matches!(result, Err(FetchError::HttpError(503))));
}

#[tokio::test]
async fn test_popular_page_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/popular.html"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<ul class="items">
                <li>
                    <div class="img"><a href="/category/naruto"><img src="/naruto.png"/></a></div>
                    <p class="name"><a href="/category/naruto">Naruto</a></p>
                    <p class="released">Released: 2002</p>
                </li>
            </ul>"#,
        ))
        .mount(&mock_server)
        .await;

    let entries = catalog(&mock_server).popular(2).await.expect("listing parses");

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name.as_deref(), Some("Naruto"));
    assert_eq!(entries[0].release_label.as_deref(), Some("2002"));
}

#[tokio::test]
async fn test_missing_episode_page_maps_to_episode_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/one-piece-episode-99999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = catalog(&mock_server).episode("one-piece", 99999).await;

    assert!(matches!(
        result,
        Err(ScrapeError::EpisodeNotFound { episode: 99999, .. })
    ));
}

#[tokio::test]
async fn test_search_not_found_marker_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.html"))
        .and(query_param("keyword", "no such anime"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="last_episodes"><ul class="items"><p>Sorry, Not found</p></ul></div>"#,
        ))
        .mount(&mock_server)
        .await;

    let result = catalog(&mock_server).search("no such anime").await;

    assert!(matches!(result, Err(ScrapeError::NotFound(_))));
}

#[tokio::test]
async fn test_invalid_episode_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = catalog(&mock_server).episode("one-piece", 0).await;

    assert!(matches!(result, Err(ScrapeError::InvalidArgument(_))));
}
