use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Main configuration structure for a link check
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Returns the report title, defaulting to "<host> broken links"
    pub fn report_title(&self) -> String {
        if let Some(title) = &self.output.report_title {
            return title.clone();
        }

        let host = Url::parse(&self.crawler.root)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "site".to_string());
        format!("{} broken links", host)
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from; only links on its host and port are followed
    pub root: String,

    /// Number of concurrent fetch workers
    pub concurrency: u32,

    /// Maximum number of hops from the root
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of URLs that may reach a terminal state
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Number of retries after the first failed attempt
    #[serde(rename = "max-tries")]
    pub max_tries: u32,

    /// Per-request timeout (seconds)
    pub timeout: u64,

    /// Delay before a failed URL is re-queued (milliseconds)
    #[serde(rename = "retry-delay", default)]
    pub retry_delay: u64,

    /// Optional proxy URL applied to every request
    #[serde(default)]
    pub proxy: Option<String>,

    /// Skip TLS certificate verification (self-signed staging sites)
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

impl CrawlerConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "broken-links".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the CSV report is written to
    #[serde(rename = "report-dir", default = "default_report_dir")]
    pub report_dir: String,

    /// Report title; the file name is derived from it
    #[serde(rename = "report-title", default)]
    pub report_title: Option<String>,

    /// Path to the SQLite database; runs are not persisted when absent
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

fn default_report_dir() -> String {
    ".".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            report_title: None,
            database_path: None,
        }
    }
}
