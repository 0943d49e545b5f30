use serde::Deserialize;

/// Value of the `type` attribute that marks an outline as a feed.
pub const FEED_KIND_RSS: &str = "rss";

/// One subscribed feed, taken from an `<outline type="rss" xmlUrl="...">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Display label from the `text` attribute.
    pub text: String,
    /// Sort key, from the `title` attribute.
    pub title: String,
    /// The `type` attribute. Always `"rss"` for parsed entries.
    pub kind: String,
    /// The `xmlUrl` attribute. Never empty for parsed entries.
    pub xml_url: String,
}

impl FeedEntry {
    /// Builds an RSS entry from its three variable attributes.
    pub fn new(text: impl Into<String>, title: impl Into<String>, xml_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
            kind: FEED_KIND_RSS.to_string(),
            xml_url: xml_url.into(),
        }
    }

    /// Returns true when an outline with these attributes is a feed entry.
    ///
    /// The `type` must literally be `rss` (case-sensitive) and `xmlUrl`
    /// must be present and non-empty.
    pub fn is_feed(kind: &str, xml_url: &str) -> bool {
        kind == FEED_KIND_RSS && !xml_url.is_empty()
    }
}

/// A grouping outline in a categorized document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Category {
    pub text: String,
    pub title: String,
}

impl Category {
    pub fn new(text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
        }
    }
}

/// A category together with the feeds found directly beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: Category,
    pub entries: Vec<FeedEntry>,
}

/// Parsed subscriptions in one of the two supported shapes.
///
/// Categories are kept in a `Vec` so that document order is the only
/// ordering they ever have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subscriptions {
    /// Every feed in one list, written under a single synthetic group.
    Flat(Vec<FeedEntry>),
    /// Feeds grouped by their enclosing category outline.
    Categorized(Vec<CategoryGroup>),
}

impl Subscriptions {
    /// Total number of feed entries across all groups.
    pub fn feed_count(&self) -> usize {
        match self {
            Subscriptions::Flat(entries) => entries.len(),
            Subscriptions::Categorized(groups) => groups.iter().map(|g| g.entries.len()).sum(),
        }
    }

    /// Number of categories. A flat list has none.
    pub fn category_count(&self) -> usize {
        match self {
            Subscriptions::Flat(_) => 0,
            Subscriptions::Categorized(groups) => groups.len(),
        }
    }

    /// Iterates over all feed entries in output order.
    pub fn entries(&self) -> Box<dyn Iterator<Item = &FeedEntry> + '_> {
        match self {
            Subscriptions::Flat(entries) => Box::new(entries.iter()),
            Subscriptions::Categorized(groups) => {
                Box::new(groups.iter().flat_map(|g| g.entries.iter()))
            }
        }
    }
}

/// How the body of a document is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Categorized when the body holds two or more groups, flat otherwise.
    #[default]
    Auto,
    /// Collect all feeds into one list.
    Flat,
    /// Keep each group and sort inside it.
    Categorized,
}
