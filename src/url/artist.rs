use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ARTIST_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/artists/(?P<slug>(?P<id>\d+)-[^/]+)").unwrap());

/// Identity of an artist derived from its detail page URL
///
/// Artist URLs look like `https://pitchfork.com/artists/30707-todolo/`; the
/// slug is `30707-todolo` and the id is `30707`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRef {
    pub id: i64,
    pub slug: String,
    pub url: Url,
}

impl ArtistRef {
    /// Parses an artist page URL, returning None if the path does not match
    pub fn parse(url: &Url) -> Option<Self> {
        let captures = ARTIST_PATH_RE.captures(url.path())?;
        let id = captures.name("id")?.as_str().parse::<i64>().ok()?;
        let slug = captures.name("slug")?.as_str().to_string();

        Some(Self {
            id,
            slug,
            url: url.clone(),
        })
    }
}
