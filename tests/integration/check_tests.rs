//! End-to-end crawls against mock sites

use broken_links::crawler::{build_http_client, Checker, CheckerSettings, CrawlOutcome, HttpFetcher};
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML page linking to the given hrefs
fn html_page(links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", anchors),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(links))
        .mount(server)
        .await;
}

fn settings(server: &MockServer, max_depth: u32, max_pages: usize, max_tries: u32) -> CheckerSettings {
    let root = Url::parse(&server.uri()).unwrap().join("/").unwrap();
    CheckerSettings::new(root, 4, max_depth, max_pages, max_tries, Duration::from_secs(5))
}

async fn run(settings: CheckerSettings) -> CrawlOutcome {
    let client = build_http_client("broken-links-test/1.0", None, false).unwrap();
    let checker = Checker::new(settings, HttpFetcher::new(client)).unwrap();
    tokio::time::timeout(Duration::from_secs(30), checker.check())
        .await
        .expect("check should terminate")
}

fn page(server: &MockServer, route: &str) -> Url {
    Url::parse(&server.uri()).unwrap().join(route).unwrap()
}

#[tokio::test]
async fn test_timed_out_link_reported_after_retries() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &[]).await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(&[]).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&server)
        .await;

    let mut custom = settings(&server, 5, 10, 2);
    custom.timeout = Duration::from_millis(200);
    let outcome = run(custom).await;

    assert_eq!(outcome.result.len(), 1);
    assert_eq!(
        outcome.result[&page(&server, "/b")],
        BTreeSet::from([page(&server, "/")])
    );
    assert_eq!(outcome.succeeded, 2);
    assert!(!outcome.interrupted);
}

#[tokio::test]
async fn test_not_found_link_lists_every_referrer() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/docs", "/blog", "/missing"]).await;
    mount_page(&server, "/docs", &["/missing", "/blog"]).await;
    mount_page(&server, "/blog", &["/missing#comments"]).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let outcome = run(settings(&server, 3, 50, 1)).await;

    assert_eq!(outcome.result.len(), 1);
    assert_eq!(
        outcome.result[&page(&server, "/missing")],
        BTreeSet::from([
            page(&server, "/"),
            page(&server, "/docs"),
            page(&server, "/blog"),
        ])
    );
}

#[tokio::test]
async fn test_depth_zero_only_fetches_root() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/child"]).await;

    Mock::given(method("GET"))
        .and(path("/child"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run(settings(&server, 0, 10, 2)).await;

    assert!(outcome.result.is_empty());
    assert_eq!(outcome.pages_visited(), 1);
}

#[tokio::test]
async fn test_cycle_fetches_each_page_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/a"]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(&["/", "/a"]))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = run(settings(&server, 10, 10, 0)).await;

    assert!(outcome.result.is_empty());
    assert_eq!(outcome.pages_visited(), 2);
}

#[tokio::test]
async fn test_page_budget_of_one() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b", "/c"]).await;
    mount_page(&server, "/a", &[]).await;
    mount_page(&server, "/b", &[]).await;
    mount_page(&server, "/c", &[]).await;

    let outcome = run(settings(&server, 5, 1, 0)).await;

    assert!(outcome.pages_visited() <= 1);
}

#[tokio::test]
async fn test_off_site_links_are_not_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&other)
        .await;

    let external = format!("{}/gone", other.uri());
    mount_page(&server, "/", &[external.as_str()]).await;

    let outcome = run(settings(&server, 3, 10, 0)).await;

    assert!(outcome.result.is_empty());
    assert_eq!(outcome.pages_visited(), 1);
}

#[tokio::test]
async fn test_non_html_pages_are_not_parsed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/notes.txt"]).await;

    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/hidden">x</a>"#, "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = run(settings(&server, 3, 10, 0)).await;

    assert!(outcome.result.is_empty());
    assert_eq!(outcome.succeeded, 2);
}

#[tokio::test]
async fn test_redirect_to_live_page_is_not_broken() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/old"]).await;
    mount_page(&server, "/new", &[]).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;

    let outcome = run(settings(&server, 3, 10, 0)).await;

    assert!(outcome.result.is_empty());
}

#[tokio::test]
async fn test_server_error_root_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let outcome = run(settings(&server, 3, 10, 2)).await;

    assert_eq!(outcome.result.len(), 1);
    assert!(outcome.result[&page(&server, "/")].is_empty());
    assert_eq!(outcome.failed, 1);
}
