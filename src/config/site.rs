//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{BlogError, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    /// Public base URL, written into the exported index
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Loading
    pub on_error: ErrorPolicy,

    // Listing
    pub words_per_minute: usize,
    pub recent_limit: usize,
    pub related_limit: usize,
    pub date_format: String,

    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),
            url: "http://localhost:3000".to_string(),

            content_dir: "posts".to_string(),
            public_dir: "public".to_string(),

            on_error: ErrorPolicy::Skip,

            words_per_minute: 200,
            recent_limit: 5,
            related_limit: 3,
            date_format: "%B %-d, %Y".to_string(),

            highlight: HighlightConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| BlogError::io(path, e))?;
        let config: SiteConfig =
            serde_yaml::from_str(&content).map_err(|e| BlogError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if config.words_per_minute == 0 {
            return Err(BlogError::Config {
                path: path.to_path_buf(),
                message: "words_per_minute must be greater than zero".to_string(),
            });
        }

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}

/// What to do with a post file that fails to parse, coerce or render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log a warning and leave the file out of the index
    #[default]
    Skip,
    /// Fail the whole load
    Abort,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Settings for `folio serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "posts");
        assert_eq!(config.words_per_minute, 200);
        assert_eq!(config.on_error, ErrorPolicy::Skip);
        assert_eq!(config.related_limit, 3);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Portfolio
content_dir: content/blog
on_error: abort
recent_limit: 3
highlight:
  line_number: true
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Portfolio");
        assert_eq!(config.content_dir, "content/blog");
        assert_eq!(config.on_error, ErrorPolicy::Abort);
        assert_eq!(config.recent_limit, 3);
        assert!(config.highlight.line_number);
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_rejects_zero_words_per_minute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "words_per_minute: 0\n").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, BlogError::Config { .. }));
    }
}
