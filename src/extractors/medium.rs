// src/extractors/medium.rs
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::BTreeMap;

use super::article::{extract_page, ParsedPage};
use super::{html, Collaborators, Extractor};
use crate::models::{ContentPayload, ExtractOutcome, ExtractionContext};
use crate::utils::error::ExtractError;

const PLATFORM: &str = "medium";

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("Failed to compile ARTICLE_SELECTOR"));

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article h1").expect("Failed to compile TITLE_SELECTOR"));

static SUBTITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("article h2, article .pw-subtitle-paragraph")
        .expect("Failed to compile SUBTITLE_SELECTOR")
});

/// Medium stories. Best used with a JavaScript-capable renderer.
pub struct MediumExtractor {
    tools: Collaborators,
}

impl MediumExtractor {
    pub fn new(tools: &Collaborators) -> Self {
        Self {
            tools: tools.clone(),
        }
    }
}

#[async_trait]
impl Extractor for MediumExtractor {
    fn kind(&self) -> &'static str {
        PLATFORM
    }

    async fn extract(&self, link: &str, ctx: &ExtractionContext) -> Result<ExtractOutcome, ExtractError> {
        extract_page(&self.tools, link, ctx, PLATFORM, parse_story).await
    }
}

fn parse_story(document: &Html) -> ParsedPage {
    let title = html::first_text(document, &TITLE_SELECTOR).or_else(|| html::page_title(document));
    let subtitle = html::first_text(document, &SUBTITLE_SELECTOR)
        .or_else(|| html::description(document))
        .unwrap_or_default();
    let content = html::first_text(document, &ARTICLE_SELECTOR)
        .unwrap_or_else(|| html::main_text(document));

    let mut fields = BTreeMap::new();
    fields.insert("Title".to_string(), title.clone().unwrap_or_default());
    fields.insert("Subtitle".to_string(), subtitle);
    fields.insert("Content".to_string(), content);

    ParsedPage {
        name: title,
        content: ContentPayload::Mapping(fields),
    }
}
