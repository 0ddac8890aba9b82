//! Content loader - reads, parses and renders every post of a content source

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{ContentSource, FrontMatter, MarkdownRenderer, Post, Render};
use crate::config::ErrorPolicy;
use crate::error::{BlogError, Result};
use crate::index::BlogIndex;

/// Loads posts from a [`ContentSource`]
pub struct ContentLoader<S, R = MarkdownRenderer> {
    source: S,
    renderer: R,
    on_error: ErrorPolicy,
}

impl<S: ContentSource, R: Render> ContentLoader<S, R> {
    /// Create a new content loader
    pub fn new(source: S, renderer: R, on_error: ErrorPolicy) -> Self {
        Self {
            source,
            renderer,
            on_error,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Build the full, sorted index.
    ///
    /// Nothing is returned until every file has been handled, so a caller
    /// never sees a partially loaded collection.
    pub fn load_index(&self) -> Result<BlogIndex> {
        let (categories, posts) = self.load_all()?;
        Ok(BlogIndex::new(categories, posts))
    }

    /// Load all posts in enumeration order (category name, then file name)
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        self.load_all().map(|(_, posts)| posts)
    }

    fn load_all(&self) -> Result<(Vec<String>, Vec<Post>)> {
        let categories = self.source.list_categories()?;
        let mut posts = Vec::new();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut skipped = 0usize;

        for category in &categories {
            for file in self.source.list_post_files(category)? {
                let loaded = self.load_post(category, &file).and_then(|post| {
                    match seen.get(&post.slug) {
                        Some(first) => Err(BlogError::DuplicateSlug {
                            slug: post.slug.clone(),
                            first: first.clone(),
                            second: post.source.clone(),
                        }),
                        None => Ok(post),
                    }
                });

                match loaded {
                    Ok(post) => {
                        seen.insert(post.slug.clone(), post.source.clone());
                        posts.push(post);
                    }
                    Err(e) if e.is_per_file() && self.on_error == ErrorPolicy::Skip => {
                        tracing::warn!("Skipping post: {}", e);
                        skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        tracing::debug!(
            "Loaded {} posts from {} categories ({} skipped)",
            posts.len(),
            categories.len(),
            skipped
        );

        Ok((categories, posts))
    }

    /// Load a single post from a file
    fn load_post(&self, category: &str, file: &str) -> Result<Post> {
        let path = self.source.locate(category, file);
        let raw = self.source.read_raw(category, file)?;

        let (fm, body) = FrontMatter::parse(&raw).map_err(|e| e.at(&path))?;
        let meta = fm.into_meta().map_err(|e| e.at(&path))?;
        let content = self.renderer.render(body).map_err(|e| e.at(&path))?;

        let slug = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file)
            .to_string();

        Ok(Post {
            slug,
            category: category.to_string(),
            meta,
            content,
            raw_content: body.to_string(),
            source: path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemorySource;

    fn plain(markdown: &str) -> Result<String> {
        Ok(format!("<p>{}</p>", markdown.trim()))
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {}\ndate: {}\n---\nBody of {}\n", title, date, title)
    }

    #[test]
    fn test_load_posts_in_enumeration_order() {
        let mut source = MemorySource::new();
        source
            .insert("career", "b.md", &post("B", "2024-01-01"))
            .insert("career", "a.md", &post("A", "2024-02-01"))
            .insert("backend", "c.md", &post("C", "2023-01-01"));

        let loader = ContentLoader::new(source, plain, ErrorPolicy::Skip);
        let posts = loader.load_posts().unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "a", "b"]);
        assert_eq!(posts[0].category, "backend");
        assert_eq!(posts[0].content, "<p>Body of C</p>");
        assert_eq!(posts[0].raw_content, "Body of C\n");
    }

    #[test]
    fn test_skip_policy_drops_bad_files() {
        let mut source = MemorySource::new();
        source
            .insert("career", "good.md", &post("Good", "2024-01-01"))
            .insert("career", "bad-date.md", &post("Bad", "someday"))
            .insert("career", "bad-yaml.md", "---\ntitle: [oops\n---\nx");

        let loader = ContentLoader::new(source, plain, ErrorPolicy::Skip);
        let posts = loader.load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "good");
    }

    #[test]
    fn test_abort_policy_fails_the_load() {
        let mut source = MemorySource::new();
        source
            .insert("career", "good.md", &post("Good", "2024-01-01"))
            .insert("career", "bad-date.md", &post("Bad", "someday"));

        let loader = ContentLoader::new(source, plain, ErrorPolicy::Abort);
        let err = loader.load_index().unwrap_err();
        match err {
            BlogError::InvalidDate { path, value } => {
                assert_eq!(path, PathBuf::from("career/bad-date.md"));
                assert_eq!(value, "someday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_slug_keeps_first() {
        let mut source = MemorySource::new();
        source
            .insert("backend", "intro.md", &post("Backend intro", "2024-01-01"))
            .insert("career", "intro.md", &post("Career intro", "2024-05-01"));

        let loader = ContentLoader::new(source.clone(), plain, ErrorPolicy::Skip);
        let posts = loader.load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].category, "backend");

        let loader = ContentLoader::new(source, plain, ErrorPolicy::Abort);
        assert!(matches!(
            loader.load_posts().unwrap_err(),
            BlogError::DuplicateSlug { .. }
        ));
    }

    #[test]
    fn test_render_failure_follows_policy() {
        let mut source = MemorySource::new();
        source.insert("career", "a.md", &post("A", "2024-01-01"));

        let failing = |_: &str| -> Result<String> {
            Err(BlogError::Render {
                path: PathBuf::new(),
                message: "boom".to_string(),
            })
        };

        let loader = ContentLoader::new(source.clone(), failing, ErrorPolicy::Skip);
        assert!(loader.load_posts().unwrap().is_empty());

        let loader = ContentLoader::new(source, failing, ErrorPolicy::Abort);
        let err = loader.load_posts().unwrap_err();
        assert!(matches!(err, BlogError::Render { ref path, .. } if path == Path::new("career/a.md")));
    }

    #[test]
    fn test_missing_category_is_fatal() {
        struct Broken;
        impl ContentSource for Broken {
            fn list_categories(&self) -> Result<Vec<String>> {
                Ok(vec!["gone".to_string()])
            }
            fn list_post_files(&self, category: &str) -> Result<Vec<String>> {
                Err(BlogError::io(
                    category,
                    std::io::Error::from(std::io::ErrorKind::PermissionDenied),
                ))
            }
            fn read_raw(&self, _: &str, _: &str) -> Result<String> {
                unreachable!()
            }
        }

        let loader = ContentLoader::new(Broken, plain, ErrorPolicy::Skip);
        assert!(matches!(
            loader.load_index().unwrap_err(),
            BlogError::Io { .. }
        ));
    }

    #[test]
    fn test_non_utf8_file_follows_policy() {
        use crate::content::FsSource;
        use std::fs;

        let dir = tempfile::tempdir().unwrap();
        let career = dir.path().join("career");
        fs::create_dir_all(&career).unwrap();
        fs::write(career.join("good.md"), post("Good", "2024-01-01")).unwrap();
        fs::write(career.join("latin1.md"), b"---\ntitle: Caf\xe9\n---\nbody").unwrap();

        let loader = ContentLoader::new(FsSource::new(dir.path()), plain, ErrorPolicy::Skip);
        let posts = loader.load_posts().unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["good"]);

        let loader = ContentLoader::new(FsSource::new(dir.path()), plain, ErrorPolicy::Abort);
        assert!(matches!(
            loader.load_posts().unwrap_err(),
            BlogError::Encoding { .. }
        ));
    }

    #[test]
    fn test_post_without_frontmatter() {
        let mut source = MemorySource::new();
        source.insert("notes", "scratch.md", "Just text.");

        let loader = ContentLoader::new(source, plain, ErrorPolicy::Abort);
        let posts = loader.load_posts().unwrap();
        assert_eq!(posts[0].meta.title, None);
        assert_eq!(posts[0].meta.date, None);
        assert_eq!(posts[0].raw_content, "Just text.");
    }
}
