//! Coverage extraction for artist pages
//!
//! This module turns an artist detail page into an [`Artist`] plus its
//! [`CoverageRecord`]s:
//! - `classify` groups the page's coverage sections by heading label
//! - `kind` maps labels onto known kinds and extraction strategies
//! - `extract` implements the link-card and list-item strategies
//! - `tracker` collects labels that have no extractor
//! - `assembler` ties the steps together for one page

mod assembler;
mod classify;
mod extract;
mod kind;
mod model;
mod tracker;

pub use assembler::ArtistAssembler;
pub use classify::classify;
pub use extract::{
    extract_section, ExtractionWarning, LinkCardExtractor, ListItemExtractor, SectionExtraction,
    SectionExtractor,
};
pub use kind::{CoverageKind, SectionKind, Strategy};
pub use model::{Artist, AssembledArtist, CoverageRecord};
pub use tracker::UnfamiliarKinds;
