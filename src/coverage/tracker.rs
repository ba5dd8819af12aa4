use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Registry of section labels that have no extractor
///
/// One instance is created per crawl run and shared by all workers; cloning
/// shares the same registry. Each label maps to the artist URLs it was seen
/// on, in the order they were recorded.
#[derive(Debug, Clone, Default)]
pub struct UnfamiliarKinds {
    inner: Arc<Mutex<BTreeMap<String, Vec<String>>>>,
}

impl UnfamiliarKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `label` appeared on `url`
    ///
    /// Returns true the first time a label is seen in this run.
    pub fn record(&self, label: &str, url: &str) -> bool {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match map.get_mut(label) {
            Some(urls) => {
                urls.push(url.to_string());
                false
            }
            None => {
                map.insert(label.to_string(), vec![url.to_string()]);
                true
            }
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
