//! Minimal DOM query layer over `scraper`
//!
//! Extractors only ever need to select elements by CSS selector and read an
//! attribute or the text of an element. [`Page`] owns the parsed document and
//! [`Node`] is a cheap copyable handle to one element inside it.
//!
//! A parsed document is not `Send`, so a `Page` must never be held across an
//! `.await`; callers parse, extract owned data and drop the page.

use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed HTML document and the URL it was fetched from
pub struct Page {
    url: Url,
    html: Html,
}

impl Page {
    /// Parses a document body fetched from `url`
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    /// URL relative links on this page resolve against
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The document root element
    pub fn root(&self) -> Node<'_> {
        Node(self.html.root_element())
    }

    /// First element in the document matching `css`
    pub fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let selector = compile(css)?;
        self.html.select(&selector).next().map(Node)
    }

    /// All elements in the document matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Vec<Node<'_>> {
        match compile(css) {
            Some(selector) => self.html.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }

    /// Resolves an href against this page's URL
    pub fn resolve(&self, href: &str) -> Option<Url> {
        resolve_href(&self.url, href)
    }
}

/// Handle to one element of a [`Page`]
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// Lowercase tag name
    pub fn name(&self) -> &'a str {
        self.0.value().name()
    }

    /// Attribute value, if present
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// All descendant text, whitespace-trimmed
    pub fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    /// Trimmed text, or None when the element has no visible text
    pub fn non_empty_text(&self) -> Option<String> {
        Some(self.text()).filter(|t| !t.is_empty())
    }

    /// First descendant matching `css`
    pub fn select_first(&self, css: &str) -> Option<Node<'a>> {
        let selector = compile(css)?;
        self.0.select(&selector).next().map(Node)
    }

    /// All descendants matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Vec<Node<'a>> {
        match compile(css) {
            Some(selector) => self.0.select(&selector).map(Node).collect(),
            None => Vec::new(),
        }
    }

    /// First direct child element with the given tag name
    pub fn child(&self, tag: &str) -> Option<Node<'a>> {
        self.0
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name().eq_ignore_ascii_case(tag))
            .map(Node)
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node(<{}>)", self.name())
    }
}

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = css, kind = "selector", "Invalid CSS selector: {:?}", e);
            None
        }
    }
}
