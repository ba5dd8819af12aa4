//! Coverage kind table
//!
//! Section headings on artist pages map onto a closed set of coverage kinds,
//! each extracted with one of two strategies. Anything else is unfamiliar.

use std::fmt;

/// Known coverage kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageKind {
    Review,
    Track,
    Feature,
    News,
    PhotoGallery,
    Video,
    EditorialPick,
}

/// How the items of a section are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Anchors holding an image and up to three heading levels
    LinkCard,
    /// List items holding a single titled link
    ListItem,
}

impl CoverageKind {
    /// Looks up the kind for a section heading
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Album Reviews" => Some(Self::Review),
            "Tracks" | "Forkcast" => Some(Self::Track),
            "Photo Galleries" => Some(Self::PhotoGallery),
            "Pitchfork.tv" => Some(Self::Video),
            "Features" => Some(Self::Feature),
            "News" => Some(Self::News),
            "The Pitch" => Some(Self::EditorialPick),
            _ => None,
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Review | Self::Track | Self::PhotoGallery | Self::Video => Strategy::LinkCard,
            Self::Feature | Self::News | Self::EditorialPick => Strategy::ListItem,
        }
    }

    /// Normalized name stored with each record
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Track => "track",
            Self::Feature => "feature",
            Self::News => "news",
            Self::PhotoGallery => "photoGallery",
            Self::Video => "video",
            Self::EditorialPick => "editorialPick",
        }
    }
}

impl fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a section heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    Known(CoverageKind),
    Unfamiliar(String),
}

impl SectionKind {
    pub fn from_label(label: &str) -> Self {
        match CoverageKind::from_label(label) {
            Some(kind) => Self::Known(kind),
            None => Self::Unfamiliar(label.to_string()),
        }
    }
}
