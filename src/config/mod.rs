//! Configuration module for the coverage crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use coverage_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Workers: {}", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;

use crate::ConfigError;
use url::Url;

impl Config {
    /// Builds the index URLs that seed the crawl, one per configured letter
    pub fn index_urls(&self) -> Result<Vec<Url>, ConfigError> {
        let base = Url::parse(&self.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        self.site
            .letters
            .iter()
            .map(|letter| {
                let path = self.site.index_path.replace("{letter}", letter);
                base.join(&path).map_err(|e| {
                    ConfigError::InvalidUrl(format!("Invalid index path '{}': {}", path, e))
                })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str, database_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 4,
            retry_delay_ms: 10,
            max_retries: 0,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        },
        site: SiteConfig {
            base_url: base_url.to_string(),
            index_path: "artists/by/{letter}/".to_string(),
            letters: vec!["a".to_string()],
        },
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            database_path: database_path.to_string(),
            summary_path: "./summary.md".to_string(),
            json_dir: None,
        },
    }
}
