// src/main.rs
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use link_harvester::capabilities::{ChromeRenderer, GitCloner, HttpRenderer, Renderer};
use link_harvester::config::{HarvestConfig, RendererKind};
use link_harvester::dispatcher::Dispatcher;
use link_harvester::extractors::Collaborators;
use link_harvester::models::{ExtractOutcome, ExtractionContext};
use link_harvester::storage::FileStore;
use link_harvester::utils::{self, AppError};

/// Command Line Interface for the link harvester
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Link to extract (repeatable)
    #[arg(short, long = "link")]
    links: Vec<String>,

    /// File with one link per line ('#' starts a comment)
    #[arg(long)]
    links_file: Option<PathBuf>,

    /// Identifier of the author the results are attributed to
    #[arg(long)]
    author_id: String,

    /// Display name of the author
    #[arg(long)]
    author_name: String,

    /// Directory holding the stored documents
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Maximum number of links extracted at the same time
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Page renderer: http or chrome
    #[arg(long)]
    renderer: Option<RendererKind>,

    /// Ignore entry for repository snapshots (repeatable, replaces the defaults)
    #[arg(long = "ignore")]
    ignore: Vec<String>,

    /// Parent directory for temporary workspaces
    #[arg(long)]
    workspace_dir: Option<PathBuf>,

    /// Render timeout in seconds
    #[arg(long)]
    render_timeout_secs: Option<u64>,

    /// Clone timeout in seconds
    #[arg(long)]
    clone_timeout_secs: Option<u64>,
}

impl Args {
    /// Environment-backed defaults with the command-line flags applied on top.
    fn to_config(&self) -> Result<HarvestConfig, AppError> {
        let mut config = HarvestConfig::from_env().map_err(AppError::Config)?;

        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(renderer) = self.renderer {
            config.renderer = renderer;
        }
        if !self.ignore.is_empty() {
            config.ignore = self.ignore.clone();
        }
        if let Some(dir) = &self.workspace_dir {
            config.workspace_root = Some(dir.clone());
        }
        if let Some(secs) = self.render_timeout_secs {
            config.render_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.clone_timeout_secs {
            config.clone_timeout = Duration::from_secs(secs);
        }

        config.validate().map_err(AppError::Config)?;
        Ok(config)
    }

    /// Links from `--link` followed by those in `--links-file`, first occurrence kept.
    fn collect_links(&self) -> Result<Vec<String>, AppError> {
        let mut links: Vec<String> = self.links.iter().map(|l| l.trim().to_string()).collect();

        if let Some(path) = &self.links_file {
            let contents = std::fs::read_to_string(path)?;
            links.extend(
                contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(str::to_string),
            );
        }

        let mut seen = std::collections::HashSet::new();
        links.retain(|link| !link.is_empty() && seen.insert(link.clone()));
        Ok(links)
    }
}

fn build_renderer(config: &HarvestConfig) -> Result<Arc<dyn Renderer>, AppError> {
    let renderer: Arc<dyn Renderer> = match config.renderer {
        RendererKind::Http => Arc::new(HttpRenderer::new(&config.user_agent, config.render_timeout)?),
        RendererKind::Chrome => Arc::new(ChromeRenderer::new(
            config.chrome_binary.clone(),
            config.user_agent.clone(),
        )),
    };
    Ok(renderer)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::debug!("Starting with args: {:?}", args);

    let config = args.to_config()?;
    let links = args.collect_links()?;
    if links.is_empty() {
        return Err(AppError::Config("No links given (use --link or --links-file)".to_string()));
    }

    // 3. Initialize storage and external tools
    let store = FileStore::new(&args.output_dir)?;
    let tools = Collaborators::new(
        Arc::new(store),
        build_renderer(&config)?,
        Arc::new(GitCloner::new(config.git_binary.clone())),
        &config,
    );

    // 4. Build the registry once, then share it
    let dispatcher = Arc::new(Dispatcher::builder(tools).with_default_bindings().build());
    let ctx = ExtractionContext::new(args.author_id.clone(), args.author_name.clone());

    tracing::info!(
        links = links.len(),
        concurrency = config.concurrency,
        renderer = ?config.renderer,
        "Processing links"
    );

    // 5. Extract every link on a bounded pool
    let results = dispatcher.dispatch_many(links, ctx, config.concurrency).await;

    let mut persisted = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for (link, result) in &results {
        match result {
            Ok(ExtractOutcome::Persisted { platform }) => {
                persisted += 1;
                tracing::debug!(link = %link, platform = %platform, "Persisted");
            }
            Ok(ExtractOutcome::AlreadyProcessed) => skipped += 1,
            Err(_) => failed += 1,
        }
    }

    tracing::info!(persisted, skipped, failed, "Processing finished");

    if failed > 0 && persisted == 0 && skipped == 0 {
        return Err(AppError::Processing(format!("All {} links failed to extract", failed)));
    }

    Ok(())
}
