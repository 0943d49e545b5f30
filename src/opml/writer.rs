use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::error::{OpmlError, Result};
use super::types::{Category, FeedEntry, Subscriptions, FEED_KIND_RSS};

/// Title of the single group a flat list is written under.
pub const DEFAULT_GROUP_TITLE: &str = "YouTube Subscriptions";

/// OPML version written to the root element.
pub const OPML_VERSION: &str = "1.1";

/// Output formatting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub xml_declaration: bool,
    /// Spaces per nesting level. 0 writes the document on one line.
    pub indent: usize,
    /// `text` and `title` of the synthetic group in flat mode.
    pub group_title: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: 2,
            group_title: DEFAULT_GROUP_TITLE.to_string(),
        }
    }
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>, what: &str) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| OpmlError::Serialize(format!("failed to write {}: {}", what, e)))
}

/// Opens a group outline. `push_attribute` escapes `& < > " '`.
fn group_start(category: &Category) -> BytesStart<'_> {
    let mut outline = BytesStart::new("outline");
    outline.push_attribute(("text", category.text.as_str()));
    outline.push_attribute(("title", category.title.as_str()));
    outline
}

fn write_entries(writer: &mut Writer<Cursor<Vec<u8>>>, entries: &[FeedEntry]) -> Result<()> {
    for entry in entries {
        let mut outline = BytesStart::new("outline");
        outline.push_attribute(("text", entry.text.as_str()));
        outline.push_attribute(("title", entry.title.as_str()));
        outline.push_attribute(("type", FEED_KIND_RSS));
        outline.push_attribute(("xmlUrl", entry.xml_url.as_str()));
        write_event(writer, Event::Empty(outline), "feed outline")?;
    }
    Ok(())
}

fn write_group(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    category: &Category,
    entries: &[FeedEntry],
) -> Result<()> {
    write_event(writer, Event::Start(group_start(category)), "group outline")?;
    write_entries(writer, entries)?;
    write_event(writer, Event::End(BytesEnd::new("outline")), "group outline end")
}

/// Serializes subscriptions as an OPML 1.1 document.
///
/// Every feed becomes a self-closing `<outline>` with `text`, `title`,
/// `type="rss"` and `xmlUrl`, in that order. A flat list is wrapped in one
/// group named [`WriteOptions::group_title`]; categorized input gets one
/// group per category, in the order given.
///
/// All attribute values, `xmlUrl` included, are escaped for attribute
/// context, so the output parses back to the same strings.
pub fn write_opml(subscriptions: &Subscriptions, options: &WriteOptions) -> Result<String> {
    let mut writer = if options.indent == 0 {
        Writer::new(Cursor::new(Vec::new()))
    } else {
        Writer::new_with_indent(Cursor::new(Vec::new()), b' ', options.indent)
    };

    if options.xml_declaration {
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
            "XML declaration",
        )?;
    }

    let mut opml = BytesStart::new("opml");
    opml.push_attribute(("version", OPML_VERSION));
    write_event(&mut writer, Event::Start(opml), "opml element")?;
    write_event(&mut writer, Event::Start(BytesStart::new("body")), "body element")?;

    match subscriptions {
        Subscriptions::Flat(entries) => {
            let group = Category::new(&options.group_title, &options.group_title);
            write_group(&mut writer, &group, entries)?;
        }
        Subscriptions::Categorized(groups) => {
            for group in groups {
                write_group(&mut writer, &group.category, &group.entries)?;
            }
        }
    }

    write_event(&mut writer, Event::End(BytesEnd::new("body")), "body end")?;
    write_event(&mut writer, Event::End(BytesEnd::new("opml")), "opml end")?;

    let mut bytes = writer.into_inner().into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes)
        .map_err(|e| OpmlError::Serialize(format!("generated OPML is not UTF-8: {}", e)))
}

/// Writes `content` to `path` atomically.
///
/// The content goes to a uniquely named temporary file in the same
/// directory, is synced to disk, then renamed over `path`. On any failure
/// the temporary file is removed and `path` is left as it was.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    let unwritable = |source: std::io::Error| OpmlError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };

    // Randomized suffix so a stale or planted temp file can't be reused
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(unwritable)?;

    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all());
    drop(file);

    if let Err(e) = written.and_then(|()| std::fs::rename(&temp_path, path)) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(unwritable(e));
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote OPML output");
    Ok(())
}
