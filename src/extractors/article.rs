// src/extractors/article.rs
use async_trait::async_trait;
use scraper::Html;
use std::collections::BTreeMap;

use super::{html, Collaborators, Extractor};
use crate::gate::IdempotenceGate;
use crate::models::{ContentPayload, ExtractOutcome, ExtractionContext, ExtractionResult};
use crate::utils::error::{ExtractError, RenderError};

const GENERIC_KIND: &str = "article";

/// What a page parser hands back for persisting.
pub(crate) struct ParsedPage {
    pub name: Option<String>,
    pub content: ContentPayload,
}

/// Fallback extractor for any link without a specific binding.
pub struct GenericArticleExtractor {
    tools: Collaborators,
}

impl GenericArticleExtractor {
    pub fn new(tools: &Collaborators) -> Self {
        Self {
            tools: tools.clone(),
        }
    }
}

#[async_trait]
impl Extractor for GenericArticleExtractor {
    fn kind(&self) -> &'static str {
        GENERIC_KIND
    }

    async fn extract(&self, link: &str, ctx: &ExtractionContext) -> Result<ExtractOutcome, ExtractError> {
        let platform = host_platform(link);
        extract_page(&self.tools, link, ctx, &platform, parse_article).await
    }
}

/// Title, description, language and main text of an arbitrary page.
pub(crate) fn parse_article(document: &Html) -> ParsedPage {
    let title = html::page_title(document);

    let mut fields = BTreeMap::new();
    fields.insert("Title".to_string(), title.clone().unwrap_or_default());
    fields.insert(
        "Subtitle".to_string(),
        html::description(document).unwrap_or_default(),
    );
    fields.insert("Content".to_string(), html::main_text(document));
    fields.insert(
        "language".to_string(),
        html::language(document).unwrap_or_default(),
    );

    ParsedPage {
        name: title,
        content: ContentPayload::Mapping(fields),
    }
}

/// Link host without a leading `www.`; "unknown" when the link has no host.
pub(crate) fn host_platform(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Shared flow for rendered pages: gate, render, parse, persist.
pub(crate) async fn extract_page(
    tools: &Collaborators,
    link: &str,
    ctx: &ExtractionContext,
    platform: &str,
    parse: fn(&Html) -> ParsedPage,
) -> Result<ExtractOutcome, ExtractError> {
    let gate = IdempotenceGate::new(tools.store.as_ref());
    if gate.already_processed(link, platform).await? {
        return Ok(ExtractOutcome::AlreadyProcessed);
    }

    tracing::info!(link = %link, platform = %platform, "Starting scraping page");

    let rendered = tokio::time::timeout(tools.render_timeout, tools.renderer.render(link))
        .await
        .map_err(|_| RenderError::Timeout(link.to_string(), tools.render_timeout))??;

    // `Html` is not Send; keep it inside this block so it never lives across an await.
    let page = {
        let document = Html::parse_document(&rendered);
        parse(&document)
    };

    let record = ExtractionResult::new(link, page.name, page.content, platform, ctx);
    tools.store.save(&record).await?;

    tracing::info!(link = %link, platform = %platform, "Finished scraping page");
    Ok(ExtractOutcome::Persisted {
        platform: platform.to_string(),
    })
}
