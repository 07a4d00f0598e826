// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::capabilities::http::DEFAULT_USER_AGENT;

/// Ignore entries used by the repository extractor when none are configured.
pub const DEFAULT_IGNORE: &[&str] = &[".git", ".toml", ".lock", ".png"];

/// Which page renderer backs the article extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Plain HTTP GET, no JavaScript.
    Http,
    /// Headless Chrome `--dump-dom`.
    Chrome,
}

impl std::str::FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(RendererKind::Http),
            "chrome" | "chromium" => Ok(RendererKind::Chrome),
            other => Err(format!("unknown renderer '{}' (expected http or chrome)", other)),
        }
    }
}

/// Runtime settings shared by the dispatcher and its extractors.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Directory prefixes / file suffixes skipped when collecting repository files.
    pub ignore: Vec<String>,
    /// Parent directory for workspaces; system temp dir when unset.
    pub workspace_root: Option<PathBuf>,
    pub render_timeout: Duration,
    pub clone_timeout: Duration,
    /// Upper bound on links extracted at the same time.
    pub concurrency: usize,
    pub renderer: RendererKind,
    pub user_agent: String,
    pub chrome_binary: PathBuf,
    pub git_binary: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            workspace_root: None,
            render_timeout: Duration::from_secs(30),
            clone_timeout: Duration::from_secs(300),
            concurrency: 4,
            renderer: RendererKind::Http,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_binary: PathBuf::from("chromium"),
            git_binary: PathBuf::from("git"),
        }
    }
}

impl HarvestConfig {
    /// Defaults overridden by `HARVEST_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();

        if let Some(dir) = lookup("HARVEST_WORKSPACE_DIR") {
            config.workspace_root = Some(PathBuf::from(dir));
        }
        if let Some(list) = lookup("HARVEST_IGNORE") {
            config.ignore = parse_list(&list);
        }
        if let Some(raw) = lookup("HARVEST_CONCURRENCY") {
            config.concurrency = raw
                .trim()
                .parse()
                .map_err(|_| format!("HARVEST_CONCURRENCY is not a number: '{}'", raw))?;
        }
        if let Some(bin) = lookup("HARVEST_CHROME_BIN") {
            config.chrome_binary = PathBuf::from(bin);
        }
        if let Some(bin) = lookup("HARVEST_GIT_BIN") {
            config.git_binary = PathBuf::from(bin);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.render_timeout.is_zero() {
            return Err("render timeout must be greater than 0".to_string());
        }
        if self.clone_timeout.is_zero() {
            return Err("clone timeout must be greater than 0".to_string());
        }
        if self.ignore.iter().any(|entry| entry.is_empty()) {
            // An empty entry would match every path.
            return Err("ignore entries must not be empty".to_string());
        }
        Ok(())
    }
}

/// Splits a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
