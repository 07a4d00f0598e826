// src/workspace.rs
//! Scoped temporary directories for extractors that stage files on disk.
//!
//! A [`Workspace`] is removed exactly once: either through [`Workspace::release`]
//! or, if the owning call panicked, returned early or was cancelled, by its
//! destructor.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use crate::utils::error::WorkspaceError;

const WORKSPACE_PREFIX: &str = "harvest-";

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

/// Hands out fresh workspaces, optionally under a fixed parent directory.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceManager {
    root: Option<PathBuf>,
    counters: Arc<Counters>,
}

impl WorkspaceManager {
    /// Workspaces go under the system temp directory, or under `root` when given.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            counters: Arc::default(),
        }
    }

    pub fn acquire(&self) -> Result<Workspace, WorkspaceError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match &self.root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(WorkspaceError::Create)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(WorkspaceError::Create)?;

        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %dir.path().display(), "Acquired workspace");

        Ok(Workspace {
            dir: Some(dir),
            counters: Arc::clone(&self.counters),
        })
    }

    /// Total workspaces handed out by this manager (and its clones).
    pub fn acquired(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    /// Total workspaces removed, explicitly or on drop.
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Workspaces currently alive.
    pub fn outstanding(&self) -> usize {
        self.acquired().saturating_sub(self.released())
    }
}

/// An exclusively owned temporary directory.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    counters: Arc<Counters>,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        // `dir` is only taken by `release`/`drop`, both of which consume the workspace.
        self.dir
            .as_ref()
            .map(|d| d.path())
            .unwrap_or_else(|| Path::new(""))
    }

    /// Removes the directory and reports any failure.
    pub fn release(mut self) -> Result<(), WorkspaceError> {
        match self.dir.take() {
            Some(dir) => remove(dir, &self.counters),
            None => Ok(()),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = remove(dir, &self.counters) {
                tracing::warn!(error = %e, "Workspace cleanup on drop failed");
            }
        }
    }
}

fn remove(dir: TempDir, counters: &Counters) -> Result<(), WorkspaceError> {
    let path = dir.path().display().to_string();
    counters.released.fetch_add(1, Ordering::SeqCst);
    dir.close()
        .map_err(|source| WorkspaceError::Cleanup { path: path.clone(), source })?;
    tracing::debug!(path = %path, "Released workspace");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(root.path().to_path_buf()));

        let workspace = manager.acquire().unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::write(path.join("file.txt"), "x").unwrap();
        assert!(path.exists());

        workspace.release().unwrap();
        assert!(!path.exists());
        assert_eq!(manager.acquired(), 1);
        assert_eq!(manager.released(), 1);
    }

    #[test]
    fn test_drop_releases_exactly_once() {
        let root = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(Some(root.path().to_path_buf()));

        let path = {
            let workspace = manager.acquire().unwrap();
            workspace.path().to_path_buf()
        };

        assert!(!path.exists());
        assert_eq!(manager.released(), 1);
        assert_eq!(manager.outstanding(), 0);
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let manager = WorkspaceManager::default();
        let a = manager.acquire().unwrap();
        let b = manager.acquire().unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(manager.outstanding(), 2);
        a.release().unwrap();
        b.release().unwrap();
        assert_eq!(manager.outstanding(), 0);
    }
}
