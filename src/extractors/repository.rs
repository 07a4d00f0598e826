// src/extractors/repository.rs
//! Repository snapshots: clone into a workspace, collect file contents,
//! persist one record, remove the workspace.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::{Collaborators, Extractor};
use crate::config::DEFAULT_IGNORE;
use crate::gate::IdempotenceGate;
use crate::models::{ContentPayload, ExtractOutcome, ExtractionContext, ExtractionResult};
use crate::utils::error::{CloneError, ExtractError};
use crate::utils::text::{decode_lossy, strip_spaces};

const KIND: &str = "github";
const PLATFORM: &str = "repository-snapshot";

/// Paths left out of a snapshot.
///
/// A directory is pruned when its path relative to the clone root starts with
/// an entry; a file is skipped when its name ends with an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    entries: Vec<String>,
}

impl IgnoreSet {
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries.into_iter().filter(|e| !e.is_empty()).collect(),
        }
    }

    pub fn skips_dir(&self, relative_dir: &str) -> bool {
        self.entries.iter().any(|e| relative_dir.starts_with(e.as_str()))
    }

    pub fn skips_file(&self, file_name: &str) -> bool {
        self.entries.iter().any(|e| file_name.ends_with(e.as_str()))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE.iter().map(|s| s.to_string()))
    }
}

pub struct RepositoryExtractor {
    tools: Collaborators,
}

impl RepositoryExtractor {
    pub fn new(tools: &Collaborators) -> Self {
        Self {
            tools: tools.clone(),
        }
    }

    /// Clone, walk and persist. Runs inside a workspace owned by the caller.
    async fn snapshot(
        &self,
        link: &str,
        ctx: &ExtractionContext,
        workspace: &Path,
    ) -> Result<ExtractOutcome, ExtractError> {
        let name = repository_name(link);
        let checkout = workspace.join(&name);

        let timeout = self.tools.clone_timeout;
        tokio::time::timeout(timeout, self.tools.cloner.clone_repo(link, &checkout))
            .await
            .map_err(|_| CloneError::Timeout(link.to_string(), timeout))??;

        let ignore = self.tools.ignore.clone();
        let root = checkout.clone();
        let files = tokio::task::spawn_blocking(move || collect_files(&root, &ignore))
            .await
            .map_err(|e| ExtractError::Walk(format!("file walk task failed: {}", e)))??;
        tracing::debug!(link = %link, files = files.len(), "Collected repository files");

        let record = ExtractionResult::new(
            link,
            Some(name),
            ContentPayload::Mapping(files),
            PLATFORM,
            ctx,
        );
        self.tools.store.save(&record).await?;

        Ok(ExtractOutcome::Persisted {
            platform: PLATFORM.to_string(),
        })
    }
}

#[async_trait]
impl Extractor for RepositoryExtractor {
    fn kind(&self) -> &'static str {
        KIND
    }

    async fn extract(&self, link: &str, ctx: &ExtractionContext) -> Result<ExtractOutcome, ExtractError> {
        let gate = IdempotenceGate::new(self.tools.store.as_ref());
        if gate.already_processed(link, PLATFORM).await? {
            return Ok(ExtractOutcome::AlreadyProcessed);
        }

        tracing::info!(link = %link, "Starting scraping repository");

        // Dropped (and removed) here on any early exit or cancellation.
        let workspace = self.tools.workspaces.acquire()?;
        let result = self.snapshot(link, ctx, workspace.path()).await;

        // A cleanup failure is reported but never replaces the extraction result.
        if let Err(cleanup) = workspace.release() {
            match &result {
                Ok(_) => tracing::warn!(link = %link, error = %cleanup, "Workspace cleanup failed after success"),
                Err(e) => tracing::warn!(link = %link, error = %cleanup, original = %e, "Workspace cleanup failed after error"),
            }
        }

        if result.is_ok() {
            tracing::info!(link = %link, "Finished scraping repository");
        }
        result
    }
}

/// Last path segment of the link, without a `.git` suffix.
pub fn repository_name(link: &str) -> String {
    let last_segment = match url::Url::parse(link) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string)),
        Err(_) => link
            .trim_end_matches('/')
            .rsplit(|c: char| c == '/' || c == ':')
            .next()
            .map(str::to_string),
    };

    let name = last_segment.unwrap_or_default();
    let name = name.trim_end_matches(".git");
    // Only used as a directory name inside the workspace.
    let safe: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        "repository".to_string()
    } else {
        safe
    }
}

/// Reads every non-ignored file under `root`, keyed by `/`-separated relative path,
/// with spaces removed. Undecodable bytes are dropped.
pub fn collect_files(root: &Path, ignore: &IgnoreSet) -> Result<BTreeMap<String, String>, ExtractError> {
    if !root.is_dir() {
        return Err(ExtractError::Walk(format!(
            "checkout {} is not a directory",
            root.display()
        )));
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && ignore.skips_dir(&relative_path(root, entry.path())))
        });

    let mut files = BTreeMap::new();
    for entry in walker {
        let entry = entry.map_err(|e| ExtractError::Walk(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if ignore.skips_file(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let relative = relative_path(root, entry.path());
        let bytes = std::fs::read(entry.path())
            .map_err(|e| ExtractError::Walk(format!("{}: {}", relative, e)))?;
        files.insert(relative, strip_spaces(&decode_lossy(&bytes)));
    }

    Ok(files)
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
