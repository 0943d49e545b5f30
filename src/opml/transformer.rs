use std::path::Path;

use super::error::Result;
use super::parser::{parse_categorized, parse_document, parse_flat, read_input};
use super::sort::sort_subscriptions;
use super::types::{Mode, Subscriptions};
use super::writer::{write_opml, write_to_file, WriteOptions};

/// Options for one parse/sort/write run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Emit per-feed diagnostics (text, title, type, url) while parsing.
    pub verbose: bool,
    pub mode: Mode,
    pub write: WriteOptions,
}

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// The mode actually used, never [`Mode::Auto`].
    pub mode: Mode,
    pub feeds: usize,
    pub categories: usize,
}

/// Result of transforming OPML text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub subscriptions: Subscriptions,
    pub output: String,
}

impl Transformed {
    pub fn summary(&self) -> Summary {
        Summary {
            mode: match self.subscriptions {
                Subscriptions::Flat(_) => Mode::Flat,
                Subscriptions::Categorized(_) => Mode::Categorized,
            },
            feeds: self.subscriptions.feed_count(),
            categories: self.subscriptions.category_count(),
        }
    }
}

/// Parses an OPML subscription list, sorts feeds by title and writes it back.
///
/// ```
/// use opml_sort::opml::{OpmlTransformer, TransformOptions};
///
/// let input = r#"<opml version="1.1"><body><outline text="Subs">
///   <outline text="b" title="b" type="rss" xmlUrl="https://b.example/rss"/>
///   <outline text="A" title="A" type="rss" xmlUrl="https://a.example/rss"/>
/// </outline></body></opml>"#;
///
/// let transformer = OpmlTransformer::new(TransformOptions::default());
/// let result = transformer.transform(input).unwrap();
/// assert!(result.output.find("title=\"A\"") < result.output.find("title=\"b\""));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpmlTransformer {
    options: TransformOptions,
}

impl OpmlTransformer {
    pub fn new(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Parses OPML text into subscriptions, in document order.
    ///
    /// With [`Mode::Auto`] the shape of the body picks the mode: groups are
    /// kept as categories, unless the only group is the flat-mode container
    /// itself (see [`Document::resolve_mode`]).
    ///
    /// [`Document::resolve_mode`]: super::parser::Document::resolve_mode
    pub fn parse(&self, content: &str) -> Result<Subscriptions> {
        let document = parse_document(content)?;
        let verbose = self.options.verbose;
        let mode = document.resolve_mode(self.options.mode, &self.options.write.group_title);
        tracing::debug!(?mode, groups = document.group_count(), "Parsing OPML body");

        Ok(match mode {
            Mode::Categorized => Subscriptions::Categorized(parse_categorized(&document, verbose)),
            Mode::Flat | Mode::Auto => Subscriptions::Flat(parse_flat(&document, verbose)),
        })
    }

    /// Sorts feeds by case-insensitive title within each group.
    pub fn sort(&self, mut subscriptions: Subscriptions) -> Subscriptions {
        sort_subscriptions(&mut subscriptions);
        subscriptions
    }

    /// Renders subscriptions as OPML text.
    pub fn serialize(&self, subscriptions: &Subscriptions) -> Result<String> {
        write_opml(subscriptions, &self.options.write)
    }

    /// Parse, sort and serialize in one step.
    pub fn transform(&self, content: &str) -> Result<Transformed> {
        let subscriptions = self.sort(self.parse(content)?);
        let output = self.serialize(&subscriptions)?;
        Ok(Transformed {
            subscriptions,
            output,
        })
    }

    /// Reads `input`, transforms it and atomically writes `output`.
    ///
    /// Nothing is written unless parsing and serialization both succeed.
    pub fn run(&self, input: &Path, output: &Path) -> Result<Summary> {
        let content = read_input(input)?;
        tracing::debug!(path = %input.display(), bytes = content.len(), "Read OPML input");

        let transformed = self.transform(&content)?;
        write_to_file(&transformed.output, output)?;

        let summary = transformed.summary();
        tracing::info!(
            feeds = summary.feeds,
            categories = summary.categories,
            "Sorted subscriptions"
        );
        Ok(summary)
    }
}
