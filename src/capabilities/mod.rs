// src/capabilities/mod.rs
//! External tools the extractors depend on, behind traits so tests can fake them.

pub mod chrome;
pub mod git;
pub mod http;

use async_trait::async_trait;
use std::path::Path;

use crate::utils::error::{CloneError, RenderError};

pub use chrome::ChromeRenderer;
pub use git::GitCloner;
pub use http::HttpRenderer;

/// Turns a link into the page's HTML.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, link: &str) -> Result<String, RenderError>;
}

/// Fetches a repository into `target_dir`, which must not exist yet.
#[async_trait]
pub trait RepoCloner: Send + Sync {
    async fn clone_repo(&self, link: &str, target_dir: &Path) -> Result<(), CloneError>;
}
