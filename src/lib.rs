//! folio: the content engine of a portfolio blog
//!
//! Posts live as markdown files in one directory per category. This crate
//! loads them, splits and coerces their front-matter, renders the bodies to
//! HTML and exposes the result as an immutable, date-ordered [`BlogIndex`]
//! that listing pages, the JSON export and the HTTP API all query.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod helpers;
pub mod index;
pub mod server;

use std::path::{Path, PathBuf};

pub use content::{Category, Post, PostSummary};
pub use error::{BlogError, Result};
pub use index::BlogIndex;

use content::{ContentLoader, FsSource, MarkdownRenderer};

/// Name of the site configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The main application handle
#[derive(Debug, Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Root of the category directories
    pub content_dir: PathBuf,
    /// Output directory for `export`
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// A loader reading from the content directory with the configured renderer
    pub fn loader(&self) -> ContentLoader<FsSource> {
        ContentLoader::new(
            FsSource::new(&self.content_dir),
            MarkdownRenderer::from_config(&self.config.highlight),
            self.config.on_error,
        )
    }

    /// Load and index every post
    pub fn load(&self) -> Result<BlogIndex> {
        let start = std::time::Instant::now();
        let index = self.loader().load_index()?;
        tracing::info!(
            "Indexed {} posts in {:.2}s",
            index.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(index)
    }

    /// Listing view of a post using the configured reading speed and date format
    pub fn summary(&self, post: &Post) -> PostSummary {
        PostSummary::new(
            post,
            self.config.words_per_minute,
            &self.config.date_format,
        )
    }
}
