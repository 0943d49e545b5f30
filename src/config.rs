//! Configuration file parser for ~/.config/opml-sort/config.toml.
//!
//! Every key is optional, and so is the file itself: when it is absent or
//! blank, the built-in defaults apply. Keys this version doesn't know are
//! collected into `unknown_keys` for the caller to report once logging runs.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::opml::{Mode, TransformOptions, WriteOptions, DEFAULT_GROUP_TITLE};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log every feed as it is parsed.
    pub verbose: bool,

    /// `auto`, `flat` or `categorized`.
    pub mode: Mode,

    /// Title of the single group written in flat mode.
    pub group_title: String,

    /// Whether to write the `<?xml ...?>` declaration.
    pub xml_declaration: bool,

    /// Spaces per indentation level in the output (0 = single line).
    pub indent: usize,

    /// Top-level keys present in the file that are not recognized.
    #[serde(skip)]
    pub unknown_keys: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            mode: Mode::Auto,
            group_title: DEFAULT_GROUP_TITLE.to_string(),
            xml_declaration: true,
            indent: 2,
            unknown_keys: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] =
        ["verbose", "mode", "group_title", "xml_declaration", "indent"];

    /// Default location: `$HOME/.config/opml-sort/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("opml-sort")
                .join("config.toml"),
        )
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, listed in `unknown_keys`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check size before reading so a huge file can't exhaust memory
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            // Deleted between metadata and read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut config: Config = toml::from_str(&content)?;
        if let Ok(raw) = content.parse::<toml::Table>() {
            config.unknown_keys = raw
                .keys()
                .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
                .cloned()
                .collect();
        }
        Ok(config)
    }

    /// Options for [`crate::opml::OpmlTransformer`] built from this config.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            verbose: self.verbose,
            mode: self.mode,
            write: WriteOptions {
                xml_declaration: self.xml_declaration,
                indent: self.indent,
                group_title: self.group_title.clone(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("opml_sort_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.verbose);
        assert_eq!(config.mode, Mode::Auto);
        assert_eq!(config.group_title, "YouTube Subscriptions");
        assert!(config.xml_declaration);
        assert_eq!(config.indent, 2);
        assert_eq!(config.transform_options(), TransformOptions::default());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/opml_sort_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "mode = \"flat\"\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.mode, Mode::Flat);
        assert_eq!(config.indent, 2); // default
        assert!(config.xml_declaration); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
verbose = true
mode = "categorized"
group_title = "Channels"
xml_declaration = false
indent = 4
"#;
        let (dir, path) = write_config("full", content);

        let config = Config::load(&path).unwrap();
        assert!(config.verbose);
        assert_eq!(config.mode, Mode::Categorized);
        assert!(config.unknown_keys.is_empty());

        let options = config.transform_options();
        assert!(options.verbose);
        assert_eq!(options.write.group_title, "Channels");
        assert!(!options.write.xml_declaration);
        assert_eq!(options.write.indent, 4);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_collected() {
        let content = r#"
indent = 3
totally_fake_key = "should not fail"
"#;
        let (dir, path) = write_config("unknown", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.indent, 3);
        assert_eq!(config.unknown_keys, vec!["totally_fake_key".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "indent = \"wide\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_mode_returns_error() {
        let (dir, path) = write_config("badmode", "mode = \"nested\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
