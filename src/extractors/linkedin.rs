// src/extractors/linkedin.rs
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::article::{extract_page, ParsedPage};
use super::{html, Collaborators, Extractor};
use crate::models::{ContentPayload, ExtractOutcome, ExtractionContext};
use crate::utils::error::ExtractError;

const PLATFORM: &str = "linkedin";

// Commentary containers on public post pages, newest markup first
static POST_TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "[data-test-id='main-feed-activity-card__commentary'], \
         .attributed-text-segment-list__content, \
         .feed-shared-update-v2__description",
    )
    .expect("Failed to compile POST_TEXT_SELECTOR")
});

static OG_DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:description']")
        .expect("Failed to compile OG_DESCRIPTION_SELECTOR")
});

/// Public LinkedIn posts. Pages behind the login wall are not supported.
pub struct LinkedInExtractor {
    tools: Collaborators,
}

impl LinkedInExtractor {
    pub fn new(tools: &Collaborators) -> Self {
        Self {
            tools: tools.clone(),
        }
    }
}

#[async_trait]
impl Extractor for LinkedInExtractor {
    fn kind(&self) -> &'static str {
        PLATFORM
    }

    async fn extract(&self, link: &str, ctx: &ExtractionContext) -> Result<ExtractOutcome, ExtractError> {
        extract_page(&self.tools, link, ctx, PLATFORM, parse_post).await
    }
}

fn parse_post(document: &Html) -> ParsedPage {
    let text = html::first_text(document, &POST_TEXT_SELECTOR)
        .or_else(|| html::meta_content(document, &OG_DESCRIPTION_SELECTOR))
        .unwrap_or_default();

    ParsedPage {
        name: html::page_title(document),
        content: ContentPayload::Text(text),
    }
}
