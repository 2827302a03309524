//! Robots cache behavior against a mock origin.

use std::time::Duration;
use url::Url;
use website_fetch::RobotsCache;

fn cache() -> RobotsCache {
    RobotsCache::new(reqwest::Client::new(), "website-fetch/1.0")
}

#[tokio::test]
async fn disallow_rules_apply_per_path() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/robots.txt")
        .with_body("User-agent: *\nDisallow: /private\n")
        .create_async()
        .await;

    let robots = cache();
    let private = Url::parse(&format!("{}/private/x", server.url())).unwrap();
    let public = Url::parse(&format!("{}/public/y", server.url())).unwrap();

    assert!(!robots.is_allowed(&private).await);
    assert!(robots.is_allowed(&public).await);
}

#[tokio::test]
async fn missing_robots_allows_everything() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/robots.txt")
        .with_status(404)
        .create_async()
        .await;

    let robots = cache();
    let url = Url::parse(&format!("{}/anything", server.url())).unwrap();
    assert!(robots.is_allowed(&url).await);
    assert_eq!(robots.crawl_delay(&url).await, None);
}

#[tokio::test]
async fn server_error_allows_everything() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/robots.txt")
        .with_status(500)
        .create_async()
        .await;

    let robots = cache();
    let url = Url::parse(&format!("{}/deep/path", server.url())).unwrap();
    assert!(robots.is_allowed(&url).await);
}

#[tokio::test]
async fn robots_is_fetched_once_per_origin() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/robots.txt")
        .with_body("User-agent: *\nDisallow: /private\n")
        .expect(1)
        .create_async()
        .await;

    let robots = cache();
    for path in ["/a", "/b", "/private/c"] {
        let url = Url::parse(&format!("{}{path}", server.url())).unwrap();
        let _ = robots.is_allowed(&url).await;
    }

    mock.assert_async().await;
    assert_eq!(robots.cached_origins(), 1);
}

#[tokio::test]
async fn crawl_delay_is_parsed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/robots.txt")
        .with_body("User-agent: *\nCrawl-delay: 2\nDisallow: /none\n")
        .create_async()
        .await;

    let robots = cache();
    let url = Url::parse(&format!("{}/page", server.url())).unwrap();
    assert_eq!(robots.crawl_delay(&url).await, Some(Duration::from_secs(2)));
}
