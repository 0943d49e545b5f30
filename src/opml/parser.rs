use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::{OpmlError, Result};
use super::types::{Category, CategoryGroup, FeedEntry, Mode};
use super::writer::DEFAULT_GROUP_TITLE;

/// Maximum allowed nesting depth for `<outline>` elements.
pub const MAX_OPML_DEPTH: usize = 50;

/// Element nesting limit: the outline limit plus `<opml>` and `<body>`.
/// Applies to every element so the tree stays shallow enough to drop.
const MAX_ELEMENT_DEPTH: usize = MAX_OPML_DEPTH + 2;

/// An XML element with its attributes and element children.
///
/// Text, comments and processing instructions are not kept; nothing in an
/// OPML body needs them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in document order, already unescaped.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    /// Returns the attribute value, or `""` when the attribute is missing.
    pub fn attr(&self, key: &str) -> &str {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All child elements with the given name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// A parsed OPML document. The root is always an `<opml>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<&Element> {
        self.root.child("body")
    }

    /// Top-level outlines of the body. Empty when there is no body.
    pub fn body_outlines(&self) -> impl Iterator<Item = &Element> {
        self.body()
            .into_iter()
            .flat_map(|body| body.children_named("outline"))
    }

    /// Top-level outlines that are groups rather than feeds.
    pub fn groups(&self) -> impl Iterator<Item = &Element> {
        self.body_outlines().filter(|o| is_group(o))
    }

    pub fn group_count(&self) -> usize {
        self.groups().count()
    }

    /// Resolves [`Mode::Auto`] against this document's shape.
    ///
    /// Any group makes the document categorized, so a real category name is
    /// never replaced. The exception is a single container already named
    /// like the synthetic flat group (the YouTube export shape), or
    /// `group_title`; no groups at all is flat too.
    pub fn resolve_mode(&self, mode: Mode, group_title: &str) -> Mode {
        if mode != Mode::Auto {
            return mode;
        }
        let mut groups = self.groups();
        match (groups.next(), groups.next()) {
            (None, _) => Mode::Flat,
            (Some(only), None) if is_flat_container(only, group_title) => Mode::Flat,
            _ => Mode::Categorized,
        }
    }
}

/// A top-level outline is a group unless it is itself a feed. Childless
/// groups count, so an empty category survives a write and re-read.
fn is_group(outline: &Element) -> bool {
    !FeedEntry::is_feed(outline.attr("type"), outline.attr("xmlUrl"))
}

fn is_flat_container(outline: &Element, group_title: &str) -> bool {
    [DEFAULT_GROUP_TITLE, group_title]
        .iter()
        .any(|name| outline.attr("title") == *name || outline.attr("text") == *name)
}

/// Reads an input file into memory.
pub fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OpmlError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => OpmlError::InputUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

/// Parses OPML text into an element tree.
///
/// Only the five predefined XML entities and character references are
/// resolved. `quick-xml` (0.37) never reads `<!ENTITY>` declarations, so a
/// custom entity in an attribute value is rejected instead of expanded.
///
/// # Errors
///
/// - [`OpmlError::Malformed`] for XML syntax errors, mismatched or unclosed
///   tags, a second root element, or a root other than `<opml>`
/// - [`OpmlError::MaxDepthExceeded`] when elements nest deeper than
///   [`MAX_OPML_DEPTH`] below `<body>`
pub fn parse_document(content: &str) -> Result<Document> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                ensure_single_root(&root, &stack)?;
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(OpmlError::MaxDepthExceeded(MAX_OPML_DEPTH));
                }
                stack.push(element_from(&e, &reader)?);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing elements are leaves, never pushed
                ensure_single_root(&root, &stack)?;
                let element = element_from(&e, &reader)?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    OpmlError::Malformed(format!(
                        "unexpected closing tag at byte {}",
                        reader.buffer_position()
                    ))
                })?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OpmlError::Malformed(format!(
                    "{} (near byte {})",
                    e,
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(OpmlError::Malformed(format!(
            "unclosed <{}> element at end of input",
            open.name
        )));
    }

    let root = root.ok_or_else(|| OpmlError::Malformed("document has no root element".into()))?;
    if root.name != "opml" {
        return Err(OpmlError::Malformed(format!(
            "expected <opml> root element, found <{}>",
            root.name
        )));
    }

    Ok(Document { root })
}

fn ensure_single_root(root: &Option<Element>, stack: &[Element]) -> Result<()> {
    if root.is_some() && stack.is_empty() {
        return Err(OpmlError::Malformed(
            "content after the root element".into(),
        ));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn element_from(start: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| {
            OpmlError::Malformed(format!("invalid attribute on <{}>: {}", name, e))
        })?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| {
                OpmlError::Malformed(format!(
                    "invalid value for '{}' on <{}>: {}",
                    key, name, e
                ))
            })?;
        attributes.push((key, value.into_owned()));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Builds a feed entry from an outline, or `None` when it isn't one.
fn feed_entry(outline: &Element, verbose: bool) -> Option<FeedEntry> {
    let kind = outline.attr("type");
    let xml_url = outline.attr("xmlUrl");
    if outline.name != "outline" || !FeedEntry::is_feed(kind, xml_url) {
        tracing::trace!(
            element = %outline.name,
            kind = %kind,
            text = %outline.attr("text"),
            "Skipping non-feed node"
        );
        return None;
    }

    let entry = FeedEntry {
        text: outline.attr("text").to_string(),
        title: outline.attr("title").to_string(),
        kind: kind.to_string(),
        xml_url: xml_url.to_string(),
    };
    if verbose {
        tracing::debug!(
            text = %entry.text,
            title = %entry.title,
            kind = %entry.kind,
            url = %entry.xml_url,
            "Found feed"
        );
    }
    Some(entry)
}

/// Collects the feeds of every top-level outline into one list.
///
/// The containers' own `text`/`title` are ignored, and feeds placed directly
/// in `<body>` are not collected.
pub fn parse_flat(document: &Document, verbose: bool) -> Vec<FeedEntry> {
    document
        .body_outlines()
        .flat_map(|container| container.children.iter())
        .filter_map(|child| feed_entry(child, verbose))
        .collect()
}

/// Collects one group per top-level outline that is not itself a feed.
///
/// Groups come out in document order. A group with no feed children,
/// whether empty or holding only non-feeds, is kept with an empty entry
/// list; the writer emits it as a childless group outline, which reads back
/// as the same empty group.
pub fn parse_categorized(document: &Document, verbose: bool) -> Vec<CategoryGroup> {
    document
        .groups()
        .map(|outline| {
            let category = Category::new(outline.attr("text"), outline.attr("title"));
            if verbose {
                tracing::debug!(text = %category.text, title = %category.title, "Found category");
            }
            let entries = outline
                .children
                .iter()
                .filter_map(|child| feed_entry(child, verbose))
                .collect();
            CategoryGroup { category, entries }
        })
        .collect()
}
