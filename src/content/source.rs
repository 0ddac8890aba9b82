//! Where post files come from
//!
//! The loader only needs three operations from its content source: list the
//! categories, list the post files of a category, and read one file. Both
//! listings come back sorted by name so that a load is reproducible no matter
//! what order the platform hands out directory entries in.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{BlogError, Result};

/// A category-organised tree of markdown files
pub trait ContentSource {
    /// Names of the category directories, sorted
    fn list_categories(&self) -> Result<Vec<String>>;

    /// Markdown file names within a category, sorted
    fn list_post_files(&self, category: &str) -> Result<Vec<String>>;

    /// Full text of one post file
    fn read_raw(&self, category: &str, file: &str) -> Result<String>;

    /// Path used when reporting problems with a file
    fn locate(&self, category: &str, file: &str) -> PathBuf {
        Path::new(category).join(file)
    }
}

/// Content read from a directory on disk
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immediate children of `dir`, sorted by file name
    fn entries(&self, dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                BlogError::io(path, source)
            })?;
            if is_hidden(entry.file_name()) {
                continue;
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl ContentSource for FsSource {
    fn list_categories(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(BlogError::io(
                &self.root,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "content directory does not exist",
                ),
            ));
        }

        Ok(self
            .entries(&self.root)?
            .into_iter()
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect())
    }

    fn list_post_files(&self, category: &str) -> Result<Vec<String>> {
        Ok(self
            .entries(&self.root.join(category))?
            .into_iter()
            .filter(|e| e.file_type().is_file() && is_markdown_file(e.path()))
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect())
    }

    fn read_raw(&self, category: &str, file: &str) -> Result<String> {
        let path = self.locate(category, file);
        let bytes = fs::read(&path).map_err(|e| BlogError::io(&path, e))?;
        String::from_utf8(bytes).map_err(|_| BlogError::Encoding { path })
    }

    fn locate(&self, category: &str, file: &str) -> PathBuf {
        self.root.join(category).join(file)
    }
}

/// Content held in memory, keyed by category then file name.
/// Categories without files are kept, like empty directories on disk.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    categories: IndexMap<String, IndexMap<String, String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a file
    pub fn insert(&mut self, category: &str, file: &str, raw: &str) -> &mut Self {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(file.to_string(), raw.to_string());
        self
    }

    /// Add an empty category
    pub fn add_category(&mut self, category: &str) -> &mut Self {
        self.categories.entry(category.to_string()).or_default();
        self
    }

    fn missing(&self, path: PathBuf) -> BlogError {
        BlogError::io(path, std::io::Error::from(std::io::ErrorKind::NotFound))
    }
}

impl ContentSource for MemorySource {
    fn list_categories(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.categories.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn list_post_files(&self, category: &str) -> Result<Vec<String>> {
        let files = self
            .categories
            .get(category)
            .ok_or_else(|| self.missing(PathBuf::from(category)))?;
        let mut names: Vec<String> = files
            .keys()
            .filter(|name| is_markdown_file(Path::new(name)))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    fn read_raw(&self, category: &str, file: &str) -> Result<String> {
        self.categories
            .get(category)
            .and_then(|files| files.get(file))
            .cloned()
            .ok_or_else(|| self.missing(self.locate(category, file)))
    }
}

/// Check if a file is a markdown file
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
