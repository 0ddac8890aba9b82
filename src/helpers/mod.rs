//! Presentation helpers shared by the listing, export and HTTP layers
//!
//! None of these values are stored on a post; they are derived each time a
//! listing is built.

mod date;

pub use date::*;

/// Estimated minutes to read `text`: one minute per `words_per_minute`
/// whitespace-separated words, rounded up, never less than one.
pub fn reading_time(text: &str, words_per_minute: usize) -> usize {
    let words = text.split_whitespace().count();
    words.div_ceil(words_per_minute.max(1)).max(1)
}

/// `system-design` -> `System Design`
pub fn category_display_name(name: &str) -> String {
    name.split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
