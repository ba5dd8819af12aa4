use crate::config::SelectorConfig;
use crate::coverage::classify::classify;
use crate::coverage::extract::extract_section;
use crate::coverage::kind::SectionKind;
use crate::coverage::model::{Artist, AssembledArtist};
use crate::coverage::tracker::UnfamiliarKinds;
use crate::crawler::{Fetcher, RawPage};
use crate::page::Page;
use crate::url::ArtistRef;
use crate::CrawlError;
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

/// Builds one [`AssembledArtist`] per artist page
///
/// Fetching is the only suspending step; everything after the document
/// arrives is synchronous.
#[derive(Clone)]
pub struct ArtistAssembler {
    fetcher: Arc<dyn Fetcher>,
    selectors: SelectorConfig,
    unfamiliar: UnfamiliarKinds,
}

impl ArtistAssembler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        selectors: SelectorConfig,
        unfamiliar: UnfamiliarKinds,
    ) -> Self {
        Self {
            fetcher,
            selectors,
            unfamiliar,
        }
    }

    /// Fetches and extracts one artist page
    ///
    /// # Returns
    ///
    /// * `Ok(AssembledArtist)` - Artist record and its coverage
    /// * `Err(CrawlError::PageFormat)` - URL is not an `artists/<id>-<slug>/` page
    /// * `Err(CrawlError::Fetch)` - The page could not be fetched
    pub async fn assemble(&self, url: &Url) -> Result<AssembledArtist, CrawlError> {
        let artist_ref = ArtistRef::parse(url).ok_or_else(|| {
            CrawlError::page_format(url.as_str(), "expected an artists/<id>-<slug>/ path")
        })?;

        let raw = self.fetcher.fetch(url).await?;
        Ok(self.assemble_page(artist_ref, &raw))
    }

    /// Extracts an already fetched artist page
    pub fn assemble_page(&self, artist_ref: ArtistRef, raw: &RawPage) -> AssembledArtist {
        let page = Page::parse(raw.url.clone(), &raw.body);
        let artist_url = artist_ref.url.to_string();

        let name = page
            .select_first(&self.selectors.artist_name)
            .and_then(|h| h.non_empty_text());
        if name.is_none() {
            tracing::debug!(url = %artist_url, "No artist name heading found");
        }

        let mut coverage = Vec::new();
        let mut warnings = Vec::new();
        let mut coverage_counts = BTreeMap::new();

        for (label, section) in classify(&page, &self.selectors.coverage_group) {
            match SectionKind::from_label(&label) {
                SectionKind::Known(kind) => {
                    let extraction = extract_section(page.url(), &label, kind, section);
                    coverage_counts.insert(label, extraction.records.len() as u32);
                    coverage.extend(extraction.records);
                    warnings.extend(extraction.warnings);
                }
                SectionKind::Unfamiliar(label) => {
                    if self.unfamiliar.record(&label, &artist_url) {
                        tracing::warn!(
                            url = %artist_url,
                            kind = "unfamiliar_kind",
                            "Unfamiliar coverage type '{}'",
                            label
                        );
                    }
                    coverage_counts.insert(label, 0);
                }
            }
        }

        AssembledArtist {
            artist: Artist {
                id: artist_ref.id,
                slug: artist_ref.slug,
                url: artist_url,
                name,
                coverage_counts,
            },
            coverage,
            warnings,
        }
    }
}
