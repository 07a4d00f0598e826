// src/dispatcher.rs
//! Link → extractor routing.
//!
//! Bindings are kept in registration order and the first pattern that matches
//! a link wins. Links nobody claims go to the generic article extractor.

use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::extractors::{
    factory, Collaborators, Extractor, ExtractorFactory, GenericArticleExtractor,
    LinkedInExtractor, MediumExtractor, RepositoryExtractor,
};
use crate::models::{ExtractOutcome, ExtractionContext};
use crate::utils::error::ExtractError;

/// A registry key derived from a domain, matched against whole links.
#[derive(Debug, Clone)]
pub struct DomainPattern {
    domain: String,
    regex: Regex,
}

impl DomainPattern {
    /// Normalizes `domain` (scheme, `www.`, path and trailing slashes removed,
    /// lowercased). Returns `None` when nothing is left.
    pub fn new(domain: &str) -> Option<Self> {
        let domain = normalize_domain(domain)?;
        let pattern = format!(r"(?i)^https?://(?:www\.)?{}(?:[/?#:]|$)", regex::escape(&domain));
        match Regex::new(&pattern) {
            Ok(regex) => Some(Self { domain, regex }),
            Err(e) => {
                tracing::warn!(domain = %domain, error = %e, "Could not compile domain pattern");
                None
            }
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn matches(&self, link: &str) -> bool {
        self.regex.is_match(link.trim())
    }
}

fn normalize_domain(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let without_scheme = match raw.find("://") {
        Some(idx) => &raw[idx + 3..],
        None => raw,
    };
    let host = without_scheme
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).trim_end_matches('.');

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

struct Binding {
    pattern: DomainPattern,
    factory: ExtractorFactory,
}

/// Assembles a [`Dispatcher`] before it is shared.
pub struct DispatcherBuilder {
    tools: Collaborators,
    bindings: Vec<Binding>,
}

impl DispatcherBuilder {
    /// Adds a binding, or replaces the factory of an existing binding for the
    /// same normalized domain while keeping its position.
    pub fn register(mut self, domain: &str, factory: ExtractorFactory) -> Self {
        let Some(pattern) = DomainPattern::new(domain) else {
            tracing::warn!(domain = %domain, "Ignoring registration with an empty domain");
            return self;
        };

        match self
            .bindings
            .iter_mut()
            .find(|b| b.pattern.domain() == pattern.domain())
        {
            Some(existing) => {
                tracing::debug!(domain = %pattern.domain(), "Replacing extractor binding");
                existing.factory = factory;
            }
            None => {
                tracing::debug!(domain = %pattern.domain(), "Registering extractor binding");
                self.bindings.push(Binding { pattern, factory });
            }
        }
        self
    }

    pub fn register_medium(self) -> Self {
        self.register(
            "https://medium.com",
            factory(|tools| Box::new(MediumExtractor::new(tools))),
        )
    }

    pub fn register_linkedin(self) -> Self {
        self.register(
            "https://linkedin.com",
            factory(|tools| Box::new(LinkedInExtractor::new(tools))),
        )
    }

    pub fn register_github(self) -> Self {
        self.register(
            "https://github.com",
            factory(|tools| Box::new(RepositoryExtractor::new(tools))),
        )
    }

    /// Medium, LinkedIn and GitHub, in that order.
    pub fn with_default_bindings(self) -> Self {
        self.register_medium().register_linkedin().register_github()
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            tools: self.tools,
            bindings: self.bindings,
        }
    }
}

/// Immutable registry; share it as `Arc<Dispatcher>`.
pub struct Dispatcher {
    tools: Collaborators,
    bindings: Vec<Binding>,
}

impl Dispatcher {
    pub fn builder(tools: Collaborators) -> DispatcherBuilder {
        DispatcherBuilder {
            tools,
            bindings: Vec::new(),
        }
    }

    /// Fresh extractor for `link`: the first matching binding in registration
    /// order, else the generic article extractor.
    pub fn resolve(&self, link: &str) -> Box<dyn Extractor> {
        for binding in &self.bindings {
            if binding.pattern.matches(link) {
                tracing::debug!(link = %link, domain = %binding.pattern.domain(), "Matched extractor binding");
                return (binding.factory)(&self.tools);
            }
        }

        tracing::warn!(link = %link, "No extractor found for link, defaulting to generic article extractor");
        Box::new(GenericArticleExtractor::new(&self.tools))
    }

    /// Resolves and runs the extractor for one link.
    pub async fn dispatch(&self, link: &str, ctx: &ExtractionContext) -> Result<ExtractOutcome, ExtractError> {
        let extractor = self.resolve(link);
        let kind = extractor.kind();
        let started = Instant::now();
        tracing::info!(link = %link, extractor = kind, "Starting extraction");

        match extractor.extract(link, ctx).await {
            Ok(outcome) => {
                tracing::info!(
                    link = %link,
                    extractor = kind,
                    outcome = ?outcome,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Finished extraction"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!(link = %link, extractor = kind, error = %e, "Extraction failed");
                Err(e)
            }
        }
    }

    /// Dispatches every link, at most `concurrency` at a time. Results come back
    /// in input order.
    ///
    /// Duplicate links in one batch may run concurrently and both persist.
    pub async fn dispatch_many(
        self: Arc<Self>,
        links: Vec<String>,
        ctx: ExtractionContext,
        concurrency: usize,
    ) -> Vec<(String, Result<ExtractOutcome, ExtractError>)> {
        let permits = Arc::new(Semaphore::new(concurrency.max(1)));
        let ctx = Arc::new(ctx);
        let mut tasks = JoinSet::new();

        for (index, link) in links.iter().cloned().enumerate() {
            let dispatcher = Arc::clone(&self);
            let permits = Arc::clone(&permits);
            let ctx = Arc::clone(&ctx);
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => dispatcher.dispatch(&link, &ctx).await,
                    Err(e) => Err(ExtractError::Aborted(e.to_string())),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<ExtractOutcome, ExtractError>>> =
            links.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "Extraction task panicked"),
            }
        }

        links
            .into_iter()
            .zip(slots)
            .map(|(link, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(ExtractError::Aborted(format!("task for {} did not complete", link)))
                });
                (link, result)
            })
            .collect()
    }

    /// Registered patterns, in match order.
    pub fn patterns(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.pattern.as_str()).collect()
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.tools
    }
}
