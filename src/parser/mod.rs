pub mod links;
pub mod sections;
pub mod video;

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Concatenated text of an element with whitespace runs collapsed.
pub(crate) fn element_text(el: &ElementRef) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s.trim(), " ").into_owned()
}
