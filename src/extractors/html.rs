// src/extractors/html.rs
// Helpers for pulling text and metadata out of rendered pages.
use once_cell::sync::Lazy;
use scraper::{node::Node, ElementRef, Html, Selector};

use crate::utils::text::collapse_whitespace;

// --- CSS Selectors (Lazy Static) ---
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile TITLE_SELECTOR"));

static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:title']").expect("Failed to compile OG_TITLE_SELECTOR")
});

static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[name='description'], meta[property='og:description']")
        .expect("Failed to compile DESCRIPTION_SELECTOR")
});

static HTML_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("html").expect("Failed to compile HTML_SELECTOR"));

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Failed to compile BODY_SELECTOR"));

// Main content containers, most specific first
static MAIN_CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "article",
        "main",
        "[role='main']",
        "#content",
        "#main",
        ".post-content",
        ".entry-content",
        ".content",
    ]
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .collect()
});

// Text under these elements is never content
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "nav", "header", "footer", "aside"];

pub fn page_title(document: &Html) -> Option<String> {
    meta_content(document, &OG_TITLE_SELECTOR).or_else(|| {
        document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    })
}

pub fn description(document: &Html) -> Option<String> {
    meta_content(document, &DESCRIPTION_SELECTOR)
}

/// `<html lang>` value, if any.
pub fn language(document: &Html) -> Option<String> {
    document
        .select(&HTML_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
}

/// Visible text of the main content area, or of the whole body when no
/// content container is present.
pub fn main_text(document: &Html) -> String {
    let root = MAIN_CONTENT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .or_else(|| document.select(&BODY_SELECTOR).next());

    match root {
        Some(root) => visible_text(root),
        None => String::new(),
    }
}

/// Collapsed text of the first element matching `selector`, if non-empty.
pub fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(visible_text)
        .find(|text| !text.is_empty())
}

/// `content` attribute of the first matching `<meta>`.
pub fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|content| !content.is_empty())
}

/// Text nodes under `root`, skipping scripts, styles and page chrome.
pub fn visible_text(root: ElementRef) -> String {
    let mut out = String::new();
    for node in root.descendants() {
        if let Node::Text(text_node) = node.value() {
            let hidden = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| HIDDEN_TAGS.contains(&ancestor.value().name()));
            if !hidden {
                out.push_str(&text_node.text);
                out.push(' ');
            }
        }
    }
    collapse_whitespace(&out)
}
