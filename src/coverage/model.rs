use crate::coverage::extract::ExtractionWarning;
use serde::Serialize;
use std::collections::BTreeMap;

/// An artist as seen on one visit of its detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    /// Numeric id taken from the artist URL; the upsert key
    pub id: i64,

    /// URL path segment including the id, e.g. "30707-todolo"
    pub slug: String,

    /// Canonical artist page URL
    pub url: String,

    /// Display name from the detail heading, when the page has one
    pub name: Option<String>,

    /// Section label -> number of records extracted for it
    ///
    /// Sections with no extractor are present with a count of zero.
    pub coverage_counts: BTreeMap<String, u32>,
}

/// One editorial item listed on an artist page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CoverageRecord {
    /// Normalized kind, e.g. "review" or "photoGallery"
    pub kind: String,

    /// Section heading the record was found under
    pub label: String,

    /// Absolute URL of the covered item
    pub url: String,

    pub title: String,

    pub author: Option<String>,

    /// Thumbnail, only present for link-card sections
    pub image: Option<String>,
}

/// Everything extracted from one artist page, ready for reconciliation
#[derive(Debug, Clone, Serialize)]
pub struct AssembledArtist {
    #[serde(flatten)]
    pub artist: Artist,
    pub coverage: Vec<CoverageRecord>,

    /// Items that were skipped because a required part was missing
    #[serde(skip)]
    pub warnings: Vec<ExtractionWarning>,
}
