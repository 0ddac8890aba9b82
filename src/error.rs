//! Error types for loading and indexing content

use std::path::PathBuf;

/// Errors raised while turning the content tree into an index.
///
/// `Io` is always fatal to a load. The per-file variants (`Encoding`,
/// `Parse`, `InvalidDate`, `Render`, `DuplicateSlug`) are subject to the configured
/// [`ErrorPolicy`](crate::config::ErrorPolicy).
#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("malformed front-matter in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid date {value:?} in {path}")]
    InvalidDate { path: PathBuf, value: String },

    #[error("failed to render {path}: {message}")]
    Render { path: PathBuf, message: String },

    #[error("duplicate slug {slug:?}: {second} collides with {first}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl BlogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error concerns a single post file rather than the whole tree.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Encoding { .. }
                | Self::Parse { .. }
                | Self::InvalidDate { .. }
                | Self::Render { .. }
                | Self::DuplicateSlug { .. }
        )
    }

    /// Attach the originating file to errors raised before the path was known.
    pub(crate) fn at(self, file: &std::path::Path) -> Self {
        match self {
            Self::Parse { message, .. } => Self::Parse {
                path: file.to_path_buf(),
                message,
            },
            Self::InvalidDate { value, .. } => Self::InvalidDate {
                path: file.to_path_buf(),
                value,
            },
            Self::Render { message, .. } => Self::Render {
                path: file.to_path_buf(),
                message,
            },
            other => other,
        }
    }
}

pub type Result<T, E = BlogError> = std::result::Result<T, E>;
