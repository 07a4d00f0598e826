// src/capabilities/chrome.rs
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

use super::Renderer;
use crate::utils::error::RenderError;

/// Renders JavaScript-heavy pages with a headless Chrome/Chromium binary and
/// returns the serialized DOM.
pub struct ChromeRenderer {
    binary: PathBuf,
    user_agent: String,
}

impl ChromeRenderer {
    pub fn new(binary: impl Into<PathBuf>, user_agent: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            user_agent: user_agent.into(),
        }
    }

    fn args(&self, link: &str) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--mute-audio".to_string(),
            "--ignore-certificate-errors".to_string(),
            format!("--user-agent={}", self.user_agent),
            "--dump-dom".to_string(),
            link.to_string(),
        ]
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, link: &str) -> Result<String, RenderError> {
        tracing::debug!(link = %link, binary = %self.binary.display(), "Rendering with headless browser");

        let output = Command::new(&self.binary)
            .args(self.args(link))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RenderError::Process {
                link: link.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(RenderError::Process {
                link: link.to_string(),
                reason: format!(
                    "exit status {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        if dom.trim().is_empty() {
            return Err(RenderError::EmptyPage(link.to_string()));
        }
        Ok(dom)
    }
}
