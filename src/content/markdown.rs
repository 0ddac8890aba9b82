//! Markdown rendering with syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::path::PathBuf;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::error::{BlogError, Result};

const DEFAULT_THEME: &str = "base16-ocean.dark";

lazy_static! {
    static ref TITLE_ATTR: Regex = Regex::new(r#"title=["']([^"']*)["']"#).unwrap();
}

/// Turns a markdown body into HTML
pub trait Render {
    fn render(&self, markdown: &str) -> Result<String>;
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(DEFAULT_THEME, false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme) {
            Some(t) => t,
            None => {
                tracing::warn!("Unknown highlight theme {:?}, using {}", theme, DEFAULT_THEME);
                themes.remove(DEFAULT_THEME).unwrap_or_default()
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers,
        }
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        Self::with_options(&config.theme, config.line_number)
    }

    /// Highlight a fenced block and wrap it in its figure
    fn highlight_block(&self, block: &CodeBlock) -> Result<String> {
        let lang = block.lang.as_deref().unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = highlighted_html_for_string(&block.code, &self.syntax_set, syntax, &self.theme)
            .map_err(|e| BlogError::Render {
                path: PathBuf::new(),
                message: format!("highlighting {} block: {}", lang, e),
            })?;

        let lang = html_escape(lang);
        let body = if self.line_numbers {
            let gutter = (1..=block.code.lines().count())
                .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
                lang, gutter, highlighted
            )
        } else {
            format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
        };

        Ok(match &block.title {
            Some(title) => format!(
                r#"<figure class="code-block"><figcaption>{}</figcaption>{}</figure>"#,
                html_escape(title),
                body
            ),
            None => body,
        })
    }
}

impl Render for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is split off before rendering, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<CodeBlock> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    code_block = Some(match kind {
                        CodeBlockKind::Fenced(info) => CodeBlock::from_info(&info),
                        CodeBlockKind::Indented => CodeBlock::default(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = code_block.take() {
                        let html = self.highlight_block(&block)?;
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some(block) => block.code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => {
                    if code_block.is_none() {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }
}

/// Any `Fn(&str) -> Result<String>` can stand in for the markdown renderer
impl<F> Render for F
where
    F: Fn(&str) -> Result<String>,
{
    fn render(&self, markdown: &str) -> Result<String> {
        self(markdown)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A fenced block collected while walking the event stream
#[derive(Debug, Default, PartialEq)]
struct CodeBlock {
    lang: Option<String>,
    title: Option<String>,
    code: String,
}

impl CodeBlock {
    /// Read the language and optional title from an info string.
    ///
    /// Both ```` ```js title="server.js" ```` and ```` ```js:server.js ```` are accepted.
    fn from_info(info: &str) -> Self {
        let info = info.trim();
        let first = info.split_whitespace().next().unwrap_or("");

        let (lang, inline_title) = match first.split_once(':') {
            Some((lang, title)) => (lang, Some(title)),
            None => (first, None),
        };

        let title = TITLE_ATTR
            .captures(info)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .or(inline_title)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            lang: Some(lang)
                .filter(|l| !l.is_empty() && !l.starts_with("title="))
                .map(str::to_string),
            title,
            code: String::new(),
        }
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
