use serde::Deserialize;

/// Main configuration structure for the coverage crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Worker pool and fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of artist pages processed concurrently
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Capacity of the artist URL queue between index crawlers and workers
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries for timeouts and 5xx responses
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_workers() -> u32 {
    15
}

fn default_queue_capacity() -> u32 {
    256
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5000
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
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Where the artist index lives
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Site root, e.g. "https://pitchfork.com/"
    pub base_url: String,

    /// Index page path relative to `base_url`; `{letter}` is substituted
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Index letters to seed the crawl with
    #[serde(default = "default_letters")]
    pub letters: Vec<String>,
}

fn default_index_path() -> String {
    "artists/by/{letter}/".to_string()
}

fn default_letters() -> Vec<String> {
    ('a'..='z')
        .map(|c| c.to_string())
        .chain(std::iter::once("other".to_string()))
        .collect()
}

/// CSS selectors used to find things on index and artist pages
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Container holding the artist links on an index page
    #[serde(default = "default_artist_list")]
    pub artist_list: String,

    /// "Next page" control on an index page
    #[serde(default = "default_next_page")]
    pub next_page: String,

    /// One coverage group on an artist page
    #[serde(default = "default_coverage_group")]
    pub coverage_group: String,

    /// Artist display name heading
    #[serde(default = "default_artist_name")]
    pub artist_name: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            artist_list: default_artist_list(),
            next_page: default_next_page(),
            coverage_group: default_coverage_group(),
            artist_name: default_artist_name(),
        }
    }
}

fn default_artist_list() -> String {
    "#artist-list".to_string()
}

fn default_next_page() -> String {
    "#main .pagination .next".to_string()
}

fn default_coverage_group() -> String {
    ".search-group".to_string()
}

fn default_artist_name() -> String {
    "#main .object-detail h1".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Path to the markdown run summary
    pub summary_path: String,

    /// Directory for per-artist JSON documents; disabled when absent
    #[serde(default)]
    pub json_dir: Option<String>,
}
