//! Config file → crawl → CSV report → run database

use broken_links::config::load_config_with_hash;
use broken_links::crawler::check;
use broken_links::output::write_csv_report;
use broken_links::storage::{open_storage, RunStatus, Storage};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

fn write_config(dir: &Path, root: &str) -> std::path::PathBuf {
    let report_dir = dir.join("reports");
    let database = dir.join("runs.db");
    let content = format!(
        r#"
[crawler]
root = "{root}"
concurrency = 4
max-depth = 3
max-pages = 100
max-tries = 1
timeout = 5

[user-agent]
crawler-name = "broken-links-test"
crawler-version = "1.0"

[output]
report-dir = "{report_dir}"
report-title = "mock site: links"
database-path = "{database}"
"#,
        root = root,
        report_dir = report_dir.display(),
        database = database.display(),
    );

    let path = dir.join("check.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_config_to_report_and_database() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><body><a href="/guide">Guide</a><a href="/dead">Dead</a></body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/guide",
        r#"<html><body><a href="/dead">Dead again</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), &format!("{}/", server.uri()));
    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    assert_eq!(hash.len(), 64);

    let outcome = check(&config, std::future::pending::<()>()).await.unwrap();
    assert_eq!(outcome.broken_count(), 1);
    assert_eq!(outcome.pages_visited(), 3);

    // CSV report
    let report = write_csv_report(
        &outcome.result,
        Path::new(&config.output.report_dir),
        &config.report_title(),
    )
    .unwrap();
    assert_eq!(report.file_name().unwrap(), "mock site_ links.csv");

    let mut reader = csv::Reader::from_path(&report).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["url", "referrers"]);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], format!("{}/dead", server.uri()));
    assert_eq!(
        &rows[0][1],
        format!("{uri}/,{uri}/guide", uri = server.uri())
    );

    // Run database
    let database = config.output.database_path.as_deref().unwrap();
    let mut storage = open_storage(Path::new(database)).unwrap();
    let run_id = storage.create_run(outcome_root(&config).as_str(), &hash).unwrap();
    storage
        .save_result(run_id, outcome.pages_visited(), &outcome.result, RunStatus::Completed)
        .unwrap();

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, run_id);
    assert_eq!(run.config_hash, hash);
    assert_eq!(run.pages_visited, Some(3));
    assert_eq!(run.broken_count, Some(1));
    assert_eq!(storage.load_result(run_id).unwrap(), outcome.result);
    assert_eq!(storage.get_broken_links(run_id).unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_root_rejected_before_crawl() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path(), "ftp://example.com/");
    assert!(load_config_with_hash(&config_path).is_err());
}

fn outcome_root(config: &broken_links::Config) -> url::Url {
    broken_links::normalize_url(&config.crawler.root).unwrap()
}
