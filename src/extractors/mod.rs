// src/extractors/mod.rs
pub mod article;
pub mod html;
pub mod linkedin;
pub mod medium;
pub mod repository;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::capabilities::{Renderer, RepoCloner};
use crate::config::HarvestConfig;
use crate::models::{ExtractOutcome, ExtractionContext};
use crate::storage::DocumentStore;
use crate::utils::error::ExtractError;
use crate::workspace::WorkspaceManager;

// Re-export key extraction types for convenience
pub use article::GenericArticleExtractor;
pub use linkedin::LinkedInExtractor;
pub use medium::MediumExtractor;
pub use repository::{IgnoreSet, RepositoryExtractor};

/// A handler that turns one kind of link into a persisted record.
///
/// Implementations must:
/// - return `Ok(ExtractOutcome::AlreadyProcessed)` when the link is stored already,
/// - persist at most one record, only after the content is complete,
/// - release any workspace they acquired before returning, whatever the outcome.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short name of the extractor kind, e.g. "github" or "article".
    fn kind(&self) -> &'static str;

    async fn extract(&self, link: &str, ctx: &ExtractionContext) -> Result<ExtractOutcome, ExtractError>;
}

/// Builds a fresh extractor for one dispatch.
pub type ExtractorFactory = Arc<dyn Fn(&Collaborators) -> Box<dyn Extractor> + Send + Sync>;

/// Everything an extractor may need, shared by all extractors of a dispatcher.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn DocumentStore>,
    pub renderer: Arc<dyn Renderer>,
    pub cloner: Arc<dyn RepoCloner>,
    pub workspaces: WorkspaceManager,
    pub ignore: IgnoreSet,
    pub render_timeout: Duration,
    pub clone_timeout: Duration,
}

impl Collaborators {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        renderer: Arc<dyn Renderer>,
        cloner: Arc<dyn RepoCloner>,
        config: &HarvestConfig,
    ) -> Self {
        Self {
            store,
            renderer,
            cloner,
            workspaces: WorkspaceManager::new(config.workspace_root.clone()),
            ignore: IgnoreSet::new(config.ignore.iter().cloned()),
            render_timeout: config.render_timeout,
            clone_timeout: config.clone_timeout,
        }
    }
}

/// Wraps a constructor function as a factory.
pub fn factory<F>(build: F) -> ExtractorFactory
where
    F: Fn(&Collaborators) -> Box<dyn Extractor> + Send + Sync + 'static,
{
    Arc::new(build)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fakes for the external collaborators.
    use super::*;
    use crate::models::ExtractionResult;
    use crate::storage::MemoryStore;
    use crate::utils::error::{CloneError, RenderError, StorageError};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves canned HTML per link.
    #[derive(Default)]
    pub struct FakeRenderer {
        pub pages: HashMap<String, String>,
        pub calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl FakeRenderer {
        pub fn with_page(mut self, link: &str, html: &str) -> Self {
            self.pages.insert(link.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn render(&self, link: &str) -> Result<String, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.pages
                .get(link)
                .cloned()
                .ok_or_else(|| RenderError::EmptyPage(link.to_string()))
        }
    }

    /// Writes a fixed file tree into the clone target, or fails.
    #[derive(Default)]
    pub struct FakeCloner {
        pub files: Vec<(String, Vec<u8>)>,
        pub fail: bool,
        /// Report success without creating the target directory.
        pub skip_checkout: bool,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
        pub targets: Mutex<Vec<std::path::PathBuf>>,
    }

    impl FakeCloner {
        pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
            self.files.push((path.to_string(), content.into()));
            self
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl RepoCloner for FakeCloner {
        async fn clone_repo(&self, link: &str, target_dir: &Path) -> Result<(), CloneError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.targets
                .lock()
                .unwrap()
                .push(target_dir.to_path_buf());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(CloneError::ExitStatus {
                    link: link.to_string(),
                    status: Some(128),
                    stderr: "fatal: repository not found".to_string(),
                });
            }
            if self.skip_checkout {
                return Ok(());
            }
            std::fs::create_dir_all(target_dir).map_err(CloneError::Spawn)?;
            for (path, content) in &self.files {
                let full = target_dir.join(path);
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent).map_err(CloneError::Spawn)?;
                }
                std::fs::write(full, content).map_err(CloneError::Spawn)?;
            }
            Ok(())
        }
    }

    /// Memory store whose `save` can be made to fail.
    #[derive(Default)]
    pub struct FlakyStore {
        pub inner: MemoryStore,
        pub fail_saves: bool,
    }

    #[async_trait]
    impl DocumentStore for FlakyStore {
        async fn find_by_link(&self, link: &str) -> Result<Option<ExtractionResult>, StorageError> {
            self.inner.find_by_link(link).await
        }

        async fn save(&self, record: &ExtractionResult) -> Result<(), StorageError> {
            if self.fail_saves {
                return Err(StorageError::Backend("disk full".to_string()));
            }
            self.inner.save(record).await
        }
    }

    /// Collaborators over the given fakes with workspaces under `workspace_root`.
    pub fn collaborators(
        store: Arc<dyn DocumentStore>,
        renderer: Arc<dyn Renderer>,
        cloner: Arc<dyn RepoCloner>,
        workspace_root: &Path,
    ) -> Collaborators {
        let config = HarvestConfig {
            workspace_root: Some(workspace_root.to_path_buf()),
            ..HarvestConfig::default()
        };
        Collaborators::new(store, renderer, cloner, &config)
    }
}
