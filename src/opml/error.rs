use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading, transforming or writing OPML.
///
/// Feed outlines that fail the `type="rss"` + `xmlUrl` check are not errors;
/// they are dropped during parsing.
#[derive(Debug, Error)]
pub enum OpmlError {
    /// The input path does not exist.
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// The input exists but could not be read (permissions, not UTF-8, ...).
    #[error("Failed to read input file '{}': {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not well-formed XML, or not an `<opml>` document.
    #[error("Malformed OPML document: {0}")]
    Malformed(String),

    /// Outline nesting depth exceeds the safety limit.
    #[error("OPML nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),

    /// Generating the output markup failed.
    #[error("Failed to generate OPML: {0}")]
    Serialize(String),

    /// The output path could not be created or written.
    #[error("Failed to write output file '{}': {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = OpmlError> = std::result::Result<T, E>;
