use crate::crawler::fetcher::{FetchError, Fetcher, RawPage};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Serves fixed bodies from memory; unknown URLs answer 404
pub(crate) struct MapFetcher {
    pages: HashMap<String, String>,
    stalled: HashSet<String>,
}

impl MapFetcher {
    pub(crate) fn new(pages: &[(&str, &str)]) -> Self {
        let pages = pages
            .iter()
            .map(|(url, body)| {
                let url = Url::parse(url).expect("test URL");
                (url.to_string(), body.to_string())
            })
            .collect();
        Self {
            pages,
            stalled: HashSet::new(),
        }
    }

    /// Makes fetches of `url` never complete
    pub(crate) fn stall(mut self, url: &str) -> Self {
        let url = Url::parse(url).expect("test URL");
        self.stalled.insert(url.to_string());
        self
    }
}

#[async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        if self.stalled.contains(url.as_str()) {
            return std::future::pending().await;
        }
        match self.pages.get(url.as_str()) {
            Some(body) => Ok(RawPage {
                url: url.clone(),
                body: body.clone(),
            }),
            None => Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
