//! Anchor extraction and the deduplicated link set.

use std::collections::HashSet;
use std::collections::hash_set;

use scraper::{ElementRef, Html};
use tracing::trace;

/// How an anchor destination is joined onto the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkJoin {
    /// `host + "/" + href`, byte for byte. With a host ending in `/` this
    /// yields a doubled separator, which existing mirrors' filenames rely on.
    #[default]
    Verbatim,
    /// Exactly one `/` between host and href.
    Normalized,
}

impl LinkJoin {
    /// Builds the absolute URL for `href`.
    #[must_use]
    pub fn join(self, host: &str, href: &str) -> String {
        match self {
            Self::Verbatim => format!("{host}/{href}"),
            Self::Normalized => format!(
                "{}/{}",
                host.trim_end_matches('/'),
                href.trim_start_matches('/')
            ),
        }
    }
}

/// Distinct archive URLs found on the listing page. Iteration order is
/// unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: HashSet<String>,
}

impl LinkSet {
    /// Number of distinct links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true when no links were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns true if `url` is in the set.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.links.contains(url)
    }

    /// Inserts a link, returning false if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.links.insert(url.into())
    }

    /// Iterates the links in unspecified order.
    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.links.iter()
    }

    /// The links in lexical order, for stable scheduling and display.
    #[must_use]
    pub fn sorted(&self) -> Vec<&str> {
        let mut links: Vec<&str> = self.links.iter().map(String::as_str).collect();
        links.sort_unstable();
        links
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LinkSet {
    type Item = String;
    type IntoIter = hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a String;
    type IntoIter = hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// Extracts archive links from listing page markup.
///
/// Every `a` element's `href` that contains `marker` is joined onto `host`.
/// Anchors without an `href` are ignored.
///
/// # Example
///
/// ```
/// use pgn_downloader_core::{LinkJoin, extract_links};
///
/// let html = r#"<a href="openings/OwenDefense.zip">x</a><a href="about.html">y</a>"#;
/// let links = extract_links(html, "https://example.test/", ".zip", LinkJoin::Verbatim);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains("https://example.test//openings/OwenDefense.zip"));
/// ```
#[must_use]
pub fn extract_links(html: &str, host: &str, marker: &str, join: LinkJoin) -> LinkSet {
    let document = Html::parse_document(html);

    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name() == "a")
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains(marker))
        .inspect(|href| trace!(href = %href, "archive anchor"))
        .map(|href| join.join(host, href))
        .collect()
}
