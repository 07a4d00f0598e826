// src/utils/error.rs
use std::time::Duration;
use thiserror::Error;

// Errors raised by the version-control fetch capability
#[derive(Error, Debug)]
pub enum CloneError {
    #[error("Failed to spawn clone process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Clone of {link} exited with status {status:?}: {stderr}")]
    ExitStatus {
        link: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Clone of {0} timed out after {1:?}")]
    Timeout(String, Duration),
}

// Errors raised by the page rendering capability
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {link}")]
    Http {
        link: String,
        status: reqwest::StatusCode,
    },

    #[error("Rendering {0} timed out after {1:?}")]
    Timeout(String, Duration),

    #[error("Renderer process failed for {link}: {reason}")]
    Process { link: String, reason: String },

    #[error("Rendered page for {0} was empty")]
    EmptyPage(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to create workspace: {0}")]
    Create(#[source] std::io::Error),

    #[error("Failed to remove workspace {path}: {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// Everything an extractor can surface to its caller. "Already processed" is
// not here: it is a successful outcome.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Clone failed: {0}")]
    Clone(#[from] CloneError),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Workspace failed: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Failed to collect files: {0}")]
    Walk(String),

    #[error("Extraction task aborted: {0}")]
    Aborted(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Render setup failed: {0}")]
    Render(#[from] RenderError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
