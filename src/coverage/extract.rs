//! Section extractors
//!
//! Turns one coverage section into normalized [`CoverageRecord`]s. Items that
//! are missing a required part are skipped with an [`ExtractionWarning`]; the
//! rest of the section is still extracted.

use crate::coverage::kind::{CoverageKind, Strategy};
use crate::coverage::model::CoverageRecord;
use crate::page::Node;
use crate::url::resolve_href;
use url::Url;

/// A coverage item that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionWarning {
    /// Section label the item belongs to
    pub label: String,
    /// Position of the item within its section
    pub index: usize,
    pub reason: String,
}

/// Output of extracting one section
#[derive(Debug, Default)]
pub struct SectionExtraction {
    /// Fully extracted records, in document order
    pub records: Vec<CoverageRecord>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Strategy interface for turning a section into records
pub trait SectionExtractor {
    /// Item elements of the section
    fn items<'a>(&self, section: Node<'a>) -> Vec<Node<'a>>;

    /// Extracts one item, or explains why it was skipped
    fn extract_item(
        &self,
        base_url: &Url,
        label: &str,
        kind: CoverageKind,
        item: Node<'_>,
    ) -> Result<CoverageRecord, String>;
}

/// Anchors holding an image, a primary heading and optional secondary and
/// tertiary headings
pub struct LinkCardExtractor;

impl SectionExtractor for LinkCardExtractor {
    fn items<'a>(&self, section: Node<'a>) -> Vec<Node<'a>> {
        section.select_all("a")
    }

    fn extract_item(
        &self,
        base_url: &Url,
        label: &str,
        kind: CoverageKind,
        anchor: Node<'_>,
    ) -> Result<CoverageRecord, String> {
        let url = resolve_item_href(base_url, anchor)?;

        let image = anchor
            .select_first("img")
            .and_then(|img| img.attr("src"))
            .map(str::to_string)
            .ok_or("missing image")?;

        // Artist for reviews and tracks, gallery title for galleries
        let primary = anchor
            .select_first("h1")
            .and_then(|h| h.non_empty_text())
            .ok_or("missing primary heading")?;

        let title = match anchor.select_first("h2").and_then(|h| h.non_empty_text()) {
            Some(secondary) => format!("{}: {}", primary, secondary),
            None => primary,
        };

        let author = anchor.select_first("h3").and_then(|h| h.non_empty_text());

        Ok(CoverageRecord {
            kind: kind.as_str().to_string(),
            label: label.to_string(),
            url,
            title,
            author,
            image: Some(image),
        })
    }
}

/// List items each holding one titled link
pub struct ListItemExtractor;

impl SectionExtractor for ListItemExtractor {
    fn items<'a>(&self, section: Node<'a>) -> Vec<Node<'a>> {
        section.select_all("li")
    }

    fn extract_item(
        &self,
        base_url: &Url,
        label: &str,
        kind: CoverageKind,
        item: Node<'_>,
    ) -> Result<CoverageRecord, String> {
        let anchor = item.select_first("a").ok_or("missing link")?;
        let url = resolve_item_href(base_url, anchor)?;
        let title = anchor.non_empty_text().ok_or("missing title")?;

        Ok(CoverageRecord {
            kind: kind.as_str().to_string(),
            label: label.to_string(),
            url,
            title,
            author: None,
            image: None,
        })
    }
}

fn resolve_item_href(base_url: &Url, anchor: Node<'_>) -> Result<String, String> {
    let href = anchor.attr("href").ok_or("missing href")?;
    resolve_href(base_url, href)
        .map(|u| u.to_string())
        .ok_or_else(|| format!("unresolvable href '{}'", href))
}

impl Strategy {
    pub fn extractor(&self) -> &'static dyn SectionExtractor {
        match self {
            Strategy::LinkCard => &LinkCardExtractor,
            Strategy::ListItem => &ListItemExtractor,
        }
    }
}

/// Extracts every item of a section with the strategy for `kind`
pub fn extract_section(
    base_url: &Url,
    label: &str,
    kind: CoverageKind,
    section: Node<'_>,
) -> SectionExtraction {
    let extractor = kind.strategy().extractor();
    let mut extraction = SectionExtraction::default();

    for (index, item) in extractor.items(section).into_iter().enumerate() {
        match extractor.extract_item(base_url, label, kind, item) {
            Ok(record) => extraction.records.push(record),
            Err(reason) => {
                tracing::warn!(
                    url = %base_url,
                    kind = "extraction",
                    section = label,
                    "Skipping item {}: {}",
                    index,
                    reason
                );
                extraction.warnings.push(ExtractionWarning {
                    label: label.to_string(),
                    index,
                    reason,
                });
            }
        }
    }

    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    const BASE: &str = "https://example.com/artists/30707-todolo/";

    fn page(html: &str) -> Page {
        Page::parse(Url::parse(BASE).unwrap(), html)
    }

    fn extract(html: &str, label: &str) -> SectionExtraction {
        let page = page(html);
        let section = page.select_first(".search-group").unwrap();
        let kind = CoverageKind::from_label(label).unwrap();
        extract_section(page.url(), label, kind, section)
    }

    #[test]
    fn test_link_card_full_record() {
        let extraction = extract(
            r#"<div class="search-group"><h1>Album Reviews</h1>
                 <a href="/review/1"><img src="img.jpg">
                   <h1>Artist X</h1><h2>Album Y</h2><h3>Author Z</h3></a>
               </div>"#,
            "Album Reviews",
        );

        assert!(extraction.warnings.is_empty());
        assert_eq!(
            extraction.records,
            vec![CoverageRecord {
                kind: "review".to_string(),
                label: "Album Reviews".to_string(),
                url: "https://example.com/review/1".to_string(),
                title: "Artist X: Album Y".to_string(),
                author: Some("Author Z".to_string()),
                image: Some("img.jpg".to_string()),
            }]
        );
    }

    #[test]
    fn test_link_card_without_secondary_heading() {
        let extraction = extract(
            r#"<div class="search-group"><h1>Photo Galleries</h1>
                 <a href="/photos/9"><img src="g.jpg"><h1>Live at the Hall</h1></a>
               </div>"#,
            "Photo Galleries",
        );

        let record = &extraction.records[0];
        assert_eq!(record.kind, "photoGallery");
        assert_eq!(record.title, "Live at the Hall");
        assert_eq!(record.author, None);
    }

    #[test]
    fn test_link_card_skips_incomplete_anchor_only() {
        let extraction = extract(
            r#"<div class="search-group"><h1>Tracks</h1>
                 <a href="/track/1"><h1>No Image</h1></a>
                 <a href="/track/2"><img src="t.jpg"></a>
                 <a><img src="t.jpg"><h1>No Href</h1></a>
                 <a href="/track/3"><img src="t.jpg"><h1>Good</h1><h2>Song</h2></a>
               </div>"#,
            "Tracks",
        );

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].title, "Good: Song");
        assert_eq!(extraction.warnings.len(), 3);
        let reasons: Vec<&str> = extraction.warnings.iter().map(|w| w.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec!["missing image", "missing primary heading", "missing href"]
        );
        assert_eq!(extraction.warnings[2].index, 2);
    }

    #[test]
    fn test_list_item_records() {
        let extraction = extract(
            r#"<div class="search-group"><h1>News</h1><ul>
                 <li><a href="/news/1">Band announces tour</a></li>
                 <li><span>posted</span> <a href="https://other.com/n/2"> Second </a></li>
               </ul></div>"#,
            "News",
        );

        assert!(extraction.warnings.is_empty());
        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[0].url, "https://example.com/news/1");
        assert_eq!(extraction.records[0].title, "Band announces tour");
        assert_eq!(extraction.records[0].kind, "news");
        assert_eq!(extraction.records[1].url, "https://other.com/n/2");
        assert_eq!(extraction.records[1].title, "Second");
        assert!(extraction.records.iter().all(|r| r.image.is_none() && r.author.is_none()));
    }

    #[test]
    fn test_list_item_without_link_is_skipped() {
        let extraction = extract(
            r#"<div class="search-group"><h1>The Pitch</h1><ul>
                 <li>no link here</li>
                 <li><a href="/thepitch/1">Pick</a></li>
               </ul></div>"#,
            "The Pitch",
        );

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].kind, "editorialPick");
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].reason, "missing link");
    }

    #[test]
    fn test_empty_section() {
        let extraction = extract(
            r#"<div class="search-group"><h1>Features</h1></div>"#,
            "Features",
        );
        assert!(extraction.records.is_empty());
        assert!(extraction.warnings.is_empty());
    }
}
