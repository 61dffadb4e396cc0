//! Ripple-Search main entry point
//!
//! This is the command-line interface for the Ripple-Search engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ripple_search::config::{hash_config_content, load_config_with_hash, Config};
use ripple_search::crawler::crawl;
use ripple_search::output::{format_results, load_statistics, print_statistics};
use ripple_search::storage::open_index;
use ripple_search::{compute_page_rank, QueryEngine, SqliteIndex};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Number of crawl runs listed by `stats`
const STATS_RECENT_RUNS: usize = 10;

/// Ripple-Search: a miniature web search engine
///
/// Ripple-Search crawls pages breadth-first from seed URLs, indexes their
/// text and links in SQLite, computes PageRank, and answers ranked
/// conjunctive queries.
#[derive(Parser, Debug)]
#[command(name = "ripple-search")]
#[command(version)]
#[command(about = "A miniature web search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the index database path from the configuration
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty index
    BuildIndex {
        /// Drop every existing table first
        #[arg(long)]
        force: bool,
    },

    /// Crawl breadth-first from seed URLs and index what is found
    Crawl {
        /// Seed URLs
        #[arg(required = true, value_name = "SEED")]
        seeds: Vec<String>,

        /// Number of rounds (defaults to crawler.max-depth)
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Recompute PageRank for every known URL
    Rank {
        /// Number of iterations (defaults to rank.iterations)
        iterations: Option<u32>,
    },

    /// Search the index
    Query {
        /// Query terms; pages must contain all of them
        #[arg(required = true, value_name = "TERM")]
        terms: Vec<String>,

        /// Print at most this many results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the signal values behind each score
        #[arg(long)]
        explain: bool,
    },

    /// Show index statistics and recent crawl runs
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), hash_config_content(""))
        }
    };

    let database = cli
        .database
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.index.database_path));

    match cli.command {
        Command::BuildIndex { force } => handle_build_index(&database, force),
        Command::Crawl { seeds, depth } => {
            let depth = depth.unwrap_or(config.crawler.max_depth);
            handle_crawl(&database, &config, &config_hash, &seeds, depth).await
        }
        Command::Rank { iterations } => {
            handle_rank(&database, iterations.unwrap_or(config.rank.iterations))
        }
        Command::Query {
            terms,
            limit,
            explain,
        } => handle_query(&database, &config, &terms.join(" "), limit, explain),
        Command::Stats => handle_stats(&database),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_search=info,warn"),
            1 => EnvFilter::new("ripple_search=debug,info"),
            2 => EnvFilter::new("ripple_search=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so query output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open(database: &Path) -> anyhow::Result<SqliteIndex> {
    open_index(database)
        .with_context(|| format!("failed to open index {}", database.display()))
}

/// Handles `build-index`: creates (or with --force, resets) the schema
fn handle_build_index(database: &Path, force: bool) -> anyhow::Result<()> {
    if force {
        tracing::warn!("Dropping existing index at {}", database.display());
    }
    SqliteIndex::build(database, force)
        .with_context(|| format!("failed to build index {}", database.display()))?;
    tracing::info!("Index ready at {}", database.display());
    Ok(())
}

/// Handles `crawl`
async fn handle_crawl(
    database: &Path,
    config: &Config,
    config_hash: &str,
    seeds: &[String],
    depth: u32,
) -> anyhow::Result<()> {
    let mut index = open(database)?;

    tracing::info!("Crawling {} seed URLs to depth {}", seeds.len(), depth);
    let summary = crawl(&mut index, config, config_hash, seeds, depth)
        .await
        .context("crawl failed")?;

    tracing::info!(
        "Run {}: {} rounds, {} pages indexed, {} already indexed, {} fetch failures, {} links",
        summary.run_id,
        summary.rounds,
        summary.pages_indexed,
        summary.pages_skipped,
        summary.fetch_failures,
        summary.links_recorded
    );
    Ok(())
}

/// Handles `rank`
fn handle_rank(database: &Path, iterations: u32) -> anyhow::Result<()> {
    let mut index = open(database)?;
    let summary =
        compute_page_rank(&mut index, iterations).context("PageRank computation failed")?;
    tracing::info!(
        "Ranked {} URLs in {} iterations",
        summary.urls,
        summary.iterations
    );
    Ok(())
}

/// Handles `query`: prints one `score<TAB>url` line per result
fn handle_query(
    database: &Path,
    config: &Config,
    query: &str,
    limit: Option<usize>,
    explain: bool,
) -> anyhow::Result<()> {
    let index = open(database)?;
    let results = QueryEngine::new(&index)
        .with_weights(config.query.weights)
        .search(query)
        .context("query failed")?;

    if results.is_empty() {
        tracing::info!("No results for '{}'", query);
    }

    for line in format_results(&results, limit.or(config.query.limit), explain) {
        println!("{}", line);
    }
    Ok(())
}

/// Handles `stats`
fn handle_stats(database: &Path) -> anyhow::Result<()> {
    let index = open(database)?;
    println!("Database: {}\n", database.display());
    let stats = load_statistics(&index, STATS_RECENT_RUNS)?;
    print_statistics(&stats);
    Ok(())
}
