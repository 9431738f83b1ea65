//! Emphasized-text extraction from HTML result snippets.
//!
//! Parsing sits behind [`FragmentParser`] so a snippet that cannot be parsed
//! contributes zero fragments instead of failing the row.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::warn;

const EMPHASIS_SELECTOR: &str = "b, strong";
const ELLIPSIS: &str = "...";
const SEPARATOR: &str = ", ";

static EMPHASIS: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(EMPHASIS_SELECTOR).ok());

pub trait FragmentParser {
    /// Text content of every emphasis element in `html`, in document order.
    fn emphasis_texts(&self, html: &str) -> Vec<String>;
}

/// html5ever-backed parser; tolerant of unbalanced or truncated markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScraperParser;

impl FragmentParser for ScraperParser {
    fn emphasis_texts(&self, html: &str) -> Vec<String> {
        let Some(selector) = EMPHASIS.as_ref() else {
            warn!("emphasis selector failed to compile");
            return vec![];
        };

        let fragment = Html::parse_fragment(html);
        fragment
            .select(selector)
            .map(|el| el.text().collect::<String>())
            .collect()
    }
}

pub fn extract_bold<'a>(snippets: impl IntoIterator<Item = &'a str>) -> String {
    extract_bold_with(&ScraperParser, snippets)
}

/// Joins cleaned emphasis fragments from all snippets, in encounter order.
pub fn extract_bold_with<'a>(
    parser: &impl FragmentParser,
    snippets: impl IntoIterator<Item = &'a str>,
) -> String {
    snippets
        .into_iter()
        .flat_map(|snippet| parser.emphasis_texts(snippet))
        .filter_map(|text| clean_fragment(&text))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

fn clean_fragment(text: &str) -> Option<String> {
    let cleaned = text.replace(ELLIPSIS, "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
