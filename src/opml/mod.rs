//! OPML subscription list handling: parse, sort and write.
//!
//! The pipeline has three stages:
//!
//! - [`parser`] - Builds an element tree with `quick-xml` and walks the body
//!   for `<outline type="rss" xmlUrl="...">` feeds
//! - [`sort`] - Stable, case-insensitive ordering by feed title
//! - [`writer`] - OPML 1.1 output with every attribute escaped, plus an
//!   atomic file write
//!
//! [`OpmlTransformer`] ties them together.
//!
//! # Modes
//!
//! A *flat* run gathers every feed into one list and writes it under a single
//! synthetic group. A *categorized* run keeps each top-level group, in
//! document order, and sorts only inside it.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use opml_sort::opml::{Mode, OpmlTransformer, TransformOptions};
//!
//! let transformer = OpmlTransformer::new(TransformOptions {
//!     mode: Mode::Categorized,
//!     ..TransformOptions::default()
//! });
//! let summary = transformer.run(Path::new("subs.opml"), Path::new("sorted.opml"))?;
//! println!("{} feeds", summary.feeds);
//! # Ok::<(), opml_sort::opml::OpmlError>(())
//! ```

mod error;
pub mod parser;
pub mod sort;
mod transformer;
mod types;
pub mod writer;

pub use error::{OpmlError, Result};
pub use parser::{parse_document, Document, Element, MAX_OPML_DEPTH};
pub use sort::{sort_entries, sort_subscriptions};
pub use transformer::{OpmlTransformer, Summary, TransformOptions, Transformed};
pub use types::{Category, CategoryGroup, FeedEntry, Mode, Subscriptions, FEED_KIND_RSS};
pub use writer::{write_opml, write_to_file, WriteOptions, DEFAULT_GROUP_TITLE};
