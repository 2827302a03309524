//! End-to-end simple-mode crawls against a mock site.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

use common::{CountingObserver, page_with_links};
use website_fetch::{FetchConfig, OutputStructure};

async fn mock_html(server: &mut mockito::Server, path: &str, body: String) {
    server
        .mock("GET", path)
        .with_header("content-type", "text/html")
        .with_body(body)
        .create_async()
        .await;
}

#[tokio::test]
async fn bfs_respects_page_and_depth_caps() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let children: Vec<String> = (0..10).map(|i| format!("{base}/c{i}")).collect();
    mock_html(&mut server, "/", page_with_links("Root", &children)).await;
    for i in 0..10 {
        let grandchildren: Vec<String> = (0..10).map(|j| format!("{base}/g{i}x{j}")).collect();
        mock_html(
            &mut server,
            &format!("/c{i}"),
            page_with_links(&format!("Child {i}"), &grandchildren),
        )
        .await;
    }

    let out = TempDir::new().unwrap();
    let config = FetchConfig::builder()
        .url(&base)
        .max_depth(1)
        .max_pages(5)
        .output_dir(out.path())
        .respect_robots(false)
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl(config).await.unwrap();

    // Root plus exactly four children; depth-2 pages never get fetched.
    assert_eq!(result.pages.len(), 5);
    assert_eq!(result.stats.total_pages, 5);
    assert!(result.pages.iter().all(|p| p.depth <= 1));
    assert_eq!(result.pages[0].depth, 0);
    assert!(result.skipped.is_empty());
}

#[tokio::test]
async fn depth_exceeded_pages_are_skipped() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let children: Vec<String> = (0..3).map(|i| format!("{base}/c{i}")).collect();
    mock_html(&mut server, "/", page_with_links("Root", &children)).await;

    let out = TempDir::new().unwrap();
    let observer = Arc::new(CountingObserver::default());
    let config = FetchConfig::builder()
        .url(&base)
        .max_depth(0)
        .output_dir(out.path())
        .respect_robots(false)
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl_with_observer(config, observer.clone())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.skipped.len(), 3);
    assert!(result.skipped.iter().all(|s| s.reason.contains("depth")));
    assert_eq!(observer.skipped.load(Ordering::SeqCst), 3);
    assert_eq!(observer.fetched.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn robots_disallow_is_skipped_and_crawl_continues() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", "/robots.txt")
        .with_body("User-agent: *\nDisallow: /private\n")
        .create_async()
        .await;
    mock_html(
        &mut server,
        "/",
        page_with_links(
            "Root",
            &[format!("{base}/private/x"), format!("{base}/public/y")],
        ),
    )
    .await;
    mock_html(&mut server, "/public/y", page_with_links("Public", &[])).await;
    let private_mock = server
        .mock("GET", "/private/x")
        .expect(0)
        .create_async()
        .await;

    let out = TempDir::new().unwrap();
    let config = FetchConfig::builder()
        .url(&base)
        .output_dir(out.path())
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl(config).await.unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].url.contains("/private/x"));
    assert!(result.skipped[0].reason.contains("robots"));
    private_mock.assert_async().await;
}

#[tokio::test]
async fn redirected_root_reports_final_url() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    server
        .mock("GET", "/a")
        .with_status(301)
        .with_header("location", "/b")
        .create_async()
        .await;
    server
        .mock("GET", "/b")
        .with_status(302)
        .with_header("location", "/c")
        .create_async()
        .await;
    mock_html(&mut server, "/c", page_with_links("Landed", &[])).await;

    let out = TempDir::new().unwrap();
    let config = FetchConfig::builder()
        .url(format!("{base}/a"))
        .output_dir(out.path())
        .respect_robots(false)
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl(config).await.unwrap();

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages[0].url(), format!("{base}/c"));
}

#[tokio::test]
async fn per_page_failures_never_abort_the_crawl() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    mock_html(
        &mut server,
        "/",
        page_with_links("Root", &[format!("{base}/missing"), format!("{base}/good")]),
    )
    .await;
    mock_html(&mut server, "/good", page_with_links("Good", &[])).await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let out = TempDir::new().unwrap();
    let observer = Arc::new(CountingObserver::default());
    let config = FetchConfig::builder()
        .url(&base)
        .output_dir(out.path())
        .respect_robots(false)
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl_with_observer(config, observer.clone())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].reason.contains("404"));
    assert_eq!(observer.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pages_are_streamed_to_disk_with_index() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    mock_html(
        &mut server,
        "/",
        page_with_links("Root", &[format!("{base}/docs/guide")]),
    )
    .await;
    mock_html(&mut server, "/docs/guide", page_with_links("Guide", &[])).await;

    let out = TempDir::new().unwrap();
    let config = FetchConfig::builder()
        .url(&base)
        .output_dir(out.path())
        .output_structure(OutputStructure::Mirror)
        .single_file(true)
        .respect_robots(false)
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl(config).await.unwrap();

    assert_eq!(result.pages.len(), 2);
    assert!(out.path().join("index.md").is_file());
    assert!(out.path().join("docs/guide.md").is_file());
    assert_eq!(result.index_file, Some(out.path().join("INDEX.md")));
    assert_eq!(result.single_file, Some(out.path().join("aggregated.md")));
    assert!(out.path().join("INDEX.md").is_file());

    let title = result.pages[0].title.as_deref();
    assert_eq!(title, Some("Root"));
}

#[tokio::test]
async fn duplicate_links_are_fetched_once() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    mock_html(
        &mut server,
        "/",
        page_with_links(
            "Root",
            &[
                format!("{base}/page"),
                format!("{base}/page?variant=1"),
                format!("{base}/page#frag"),
            ],
        ),
    )
    .await;
    let page_mock = server
        .mock("GET", "/page")
        .with_header("content-type", "text/html")
        .with_body(page_with_links("Page", &[]))
        .expect(1)
        .create_async()
        .await;

    let out = TempDir::new().unwrap();
    let config = FetchConfig::builder()
        .url(&base)
        .output_dir(out.path())
        .respect_robots(false)
        .delay_ms(0)
        .build()
        .unwrap();

    let result = website_fetch::crawl(config).await.unwrap();

    assert_eq!(result.pages.len(), 2);
    page_mock.assert_async().await;
}
