//! Korni main entry point
//!
//! This is the command-line interface for the Korni site search engine.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use korni::config::load_config_with_hash;
use korni::crawler::CrawlSignal;
use korni::lemma::LemmaExtractor;
use korni::morphology::RussianMorphology;
use korni::search::SearchEngine;
use korni::service::{IndexingService, StatisticsService};
use korni::storage::{open_storage, shared, SharedStorage};
use tracing_subscriber::EnvFilter;

/// Korni: a site-scoped lemma search engine
///
/// Korni crawls a configured set of sites, extracts normalized word
/// roots from their pages, and answers ranked free-text queries against
/// the resulting index.
#[derive(Parser, Debug)]
#[command(name = "korni")]
#[command(version = "1.0.0")]
#[command(about = "A site-scoped lemma search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "korni.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Index all configured sites from a fresh state
    Index,

    /// Index a single page belonging to a configured site
    IndexPage {
        /// Full URL of the page to index
        #[arg(long)]
        url: String,
    },

    /// Run a ranked search against the stored index
    Search {
        /// Free-text query
        query: String,

        /// Limit the search to one configured site URL
        #[arg(long)]
        site: Option<String>,

        /// Number of leading results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of results to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show indexing statistics and exit
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let storage = shared(open_storage(Path::new(&config.output.database_path))?);
    let extractor = Arc::new(LemmaExtractor::new(Arc::new(RussianMorphology::new())));

    match cli.command {
        Command::Index => handle_index(config, storage, extractor).await?,
        Command::IndexPage { url } => {
            handle_index_page(config, storage, extractor, &url).await?
        }
        Command::Search {
            query,
            site,
            offset,
            limit,
        } => handle_search(config, storage, extractor, &query, site.as_deref(), offset, limit).await?,
        Command::Stats => handle_stats(config, storage).await?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("korni=info,warn"),
            1 => EnvFilter::new("korni=debug,info"),
            2 => EnvFilter::new("korni=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `index` command: full indexing of every configured site
async fn handle_index(
    config: korni::config::Config,
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
) -> anyhow::Result<()> {
    let site_count = config.sites.len();
    tracing::info!("Indexing {} configured site(s)", site_count);

    let signal = CrawlSignal::new();
    let service = IndexingService::new(config, storage, extractor, signal);

    // Ctrl-C requests a cooperative stop; in-flight fetches finish first.
    let stopper = service.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Stop requested, finishing in-flight work");
            stopper.stop();
        }
    });

    service.index_all_sites().await?;
    tracing::info!("Indexing finished");
    Ok(())
}

/// Handles the `index-page` command
async fn handle_index_page(
    config: korni::config::Config,
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
    url: &str,
) -> anyhow::Result<()> {
    let signal = CrawlSignal::new();
    let service = IndexingService::new(config, storage, extractor, signal);

    service.index_page(url).await?;
    tracing::info!("Page indexed: {}", url);
    Ok(())
}

/// Handles the `search` command: prints ranked results
async fn handle_search(
    config: korni::config::Config,
    storage: SharedStorage,
    extractor: Arc<LemmaExtractor>,
    query: &str,
    site: Option<&str>,
    offset: usize,
    limit: usize,
) -> anyhow::Result<()> {
    let engine = SearchEngine::new(storage, extractor, config.sites.clone());
    let outcome = engine.search(query, site, offset, limit).await?;

    println!("{} result(s) for \"{}\"\n", outcome.count, query);
    for result in &outcome.results {
        println!("[{:.3}] {}", result.relevance, result.title);
        println!("  {}{}", result.site, result.uri);
        println!("  {}\n", result.snippet);
    }

    Ok(())
}

/// Handles the `stats` command
async fn handle_stats(
    config: korni::config::Config,
    storage: SharedStorage,
) -> anyhow::Result<()> {
    let service = StatisticsService::new(config, storage, CrawlSignal::new());
    let report = service.collect().await?;

    println!("=== Korni Statistics ===\n");
    println!("Sites:  {}", report.total.sites);
    println!("Pages:  {}", report.total.pages);
    println!("Lemmas: {}", report.total.lemmas);
    println!();

    for site in &report.detailed {
        println!("{} ({})", site.name, site.url);
        println!("  Status: {}", site.status);
        if let Some(error) = &site.last_error {
            println!("  Last error: {}", error);
        }
        println!("  Pages: {}, Lemmas: {}", site.pages, site.lemmas);
        println!();
    }

    Ok(())
}
