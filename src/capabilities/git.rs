// src/capabilities/git.rs
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::RepoCloner;
use crate::utils::error::CloneError;

/// Shallow-clones repositories with the `git` command-line client.
pub struct GitCloner {
    binary: PathBuf,
}

impl GitCloner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait]
impl RepoCloner for GitCloner {
    async fn clone_repo(&self, link: &str, target_dir: &Path) -> Result<(), CloneError> {
        tracing::debug!(link = %link, target = %target_dir.display(), "Running git clone");

        let output = Command::new(&self.binary)
            .args(["clone", "--depth", "1", "--quiet", "--"])
            .arg(link)
            .arg(target_dir)
            // Never block on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(CloneError::Spawn)?;

        if !output.status.success() {
            return Err(CloneError::ExitStatus {
                link: link.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let cloner = GitCloner::new("/nonexistent/git-binary");
        let err = cloner
            .clone_repo("https://github.com/acme/widget", &dir.path().join("widget"))
            .await
            .unwrap_err();
        assert!(matches!(err, CloneError::Spawn(_)));
    }
}
