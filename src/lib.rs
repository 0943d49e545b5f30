//! Sorts the feeds of an OPML subscription export by title.
//!
//! See [`opml::OpmlTransformer`] for the parse → sort → write pipeline and
//! [`config::Config`] for the optional TOML configuration file.

pub mod config;
pub mod opml;
