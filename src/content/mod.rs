//! Content module - loads, parses and renders posts

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
mod source;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use loader::ContentLoader;
pub use markdown::{MarkdownRenderer, Render};
pub use post::{Category, Post, PostMeta, PostSummary};
pub use source::{is_markdown_file, ContentSource, FsSource, MemorySource};
