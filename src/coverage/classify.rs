use crate::page::{Node, Page};
use std::collections::BTreeMap;

/// Groups an artist page's coverage sections by heading label
///
/// Every element matching `group_selector` is a section; the trimmed text of
/// its own `h1` child is the label. When two sections share a label the later
/// one replaces the earlier one; they are not merged. Sections without a
/// heading are logged and skipped.
pub fn classify<'a>(page: &'a Page, group_selector: &str) -> BTreeMap<String, Node<'a>> {
    let mut sections = BTreeMap::new();

    for (index, group) in page.select_all(group_selector).into_iter().enumerate() {
        let Some(label) = group.child("h1").and_then(|h| h.non_empty_text()) else {
            tracing::warn!(
                url = %page.url(),
                kind = "page_format",
                "Coverage group {} has no heading, skipping",
                index
            );
            continue;
        };

        if sections.insert(label.clone(), group).is_some() {
            tracing::debug!(
                url = %page.url(),
                "Duplicate coverage label '{}', keeping the last section",
                label
            );
        }
    }

    sections
}
