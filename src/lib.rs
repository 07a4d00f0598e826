// src/lib.rs
//! Routes content links (articles, repositories, social posts) to the right
//! extractor and stores one normalized record per link.
//!
//! ```no_run
//! use std::sync::Arc;
//! use link_harvester::capabilities::{GitCloner, HttpRenderer};
//! use link_harvester::config::HarvestConfig;
//! use link_harvester::dispatcher::Dispatcher;
//! use link_harvester::extractors::Collaborators;
//! use link_harvester::models::ExtractionContext;
//! use link_harvester::storage::FileStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::default();
//! let tools = Collaborators::new(
//!     Arc::new(FileStore::new("./output")?),
//!     Arc::new(HttpRenderer::new(&config.user_agent, config.render_timeout)?),
//!     Arc::new(GitCloner::default()),
//!     &config,
//! );
//! let dispatcher = Dispatcher::builder(tools).with_default_bindings().build();
//!
//! let ctx = ExtractionContext::new("author-1", "Ada Lovelace");
//! dispatcher.dispatch("https://github.com/acme/widget", &ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod capabilities;
pub mod config;
pub mod dispatcher;
pub mod extractors;
pub mod gate;
pub mod models;
pub mod storage;
pub mod utils;
pub mod workspace;

pub use dispatcher::{Dispatcher, DispatcherBuilder, DomainPattern};
pub use extractors::{Collaborators, Extractor, ExtractorFactory};
pub use models::{Author, ContentPayload, ExtractOutcome, ExtractionContext, ExtractionResult};
pub use utils::error::{AppError, CloneError, ExtractError, RenderError, StorageError, WorkspaceError};
