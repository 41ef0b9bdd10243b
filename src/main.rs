//! gh-explorer - browse a GitHub repository's files from the terminal
//!
//! # Usage
//! ```bash
//! gh-explorer rust-lang/rust               # Interactive explorer
//! gh-explorer -b dev octo/hello            # Start on another branch
//! gh-explorer tree octo/hello              # Print the full tree and exit
//! gh-explorer branches octo/hello          # List branches
//! gh-explorer cat octo/hello src/main.rs   # Print one file
//! gh-explorer clear-cache                  # Erase the persisted cache
//! ```

mod app;
mod cache;
mod error;
mod github;
mod state;
mod tree;
mod ui;

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use cache::{CacheMedium, CacheStore, FileMedium, MemoryMedium};
use github::{GitHubClient, RepoId};
use state::{DEFAULT_BRANCH, RepositoryDataController};

/// Browse a GitHub repository's file tree and file contents
#[derive(Parser)]
#[command(name = "gh-explorer")]
#[command(about = "Browse a GitHub repository's files from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository as owner/name or a github.com URL
    #[arg(value_name = "REPO")]
    repo: Option<String>,

    /// Branch to open
    #[arg(short, long, default_value = DEFAULT_BRANCH, global = true)]
    branch: String,

    /// Minutes a cached response stays fresh
    #[arg(long, default_value_t = 60, global = true)]
    ttl_minutes: u64,

    /// Cache file location (defaults to the platform cache directory)
    #[arg(long, value_name = "PATH", global = true)]
    cache_file: Option<PathBuf>,

    /// Keep the cache in memory only
    #[arg(long, global = true)]
    no_persist: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the repository tree with every folder expanded, then exit
    Tree {
        /// Repository as owner/name or a github.com URL
        #[arg(value_name = "REPO")]
        repo: String,
    },
    /// List the repository's branches
    Branches {
        /// Repository as owner/name or a github.com URL
        #[arg(value_name = "REPO")]
        repo: String,
    },
    /// Print one file from the selected branch
    Cat {
        /// Repository as owner/name or a github.com URL
        #[arg(value_name = "REPO")]
        repo: String,

        /// Path of the file inside the repository
        #[arg(value_name = "PATH")]
        path: String,
    },
    /// Erase the persisted response cache
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Tree { repo }) => {
            init_logging(false);
            print_tree(&cli, repo).await
        }
        Some(Commands::Branches { repo }) => {
            init_logging(false);
            print_branches(&cli, repo).await
        }
        Some(Commands::Cat { repo, path }) => {
            init_logging(false);
            print_file(&cli, repo, path).await
        }
        Some(Commands::ClearCache) => {
            init_logging(false);
            clear_cache(&cli)
        }
        None => {
            let Some(repo) = cli.repo.as_deref() else {
                bail!("missing repository, pass owner/name (see --help)");
            };
            init_logging(true);
            run_explorer(&cli, repo)
        }
    }
}

/// Route tracing output to stderr, or to the log file while the TUI owns the terminal.
fn init_logging(interactive: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gh_explorer=info"));
    let log_file = if interactive { open_log_file() } else { None };
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(file) => registry
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        // Writing to stderr would corrupt the TUI
        None if interactive => registry.init(),
        None => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
    }
}

fn open_log_file() -> Option<fs::File> {
    let path = cache::paths::log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn cache_medium(cli: &Cli) -> anyhow::Result<Box<dyn CacheMedium>> {
    if cli.no_persist {
        return Ok(Box::new(MemoryMedium::new()));
    }

    let medium = match &cli.cache_file {
        Some(path) => FileMedium::new(path),
        None => FileMedium::default_location()
            .context("could not resolve a cache directory, use --cache-file or --no-persist")?,
    };
    tracing::debug!(path = %medium.path().display(), "using cache file");
    Ok(Box::new(medium))
}

fn open_cache(cli: &Cli) -> anyhow::Result<CacheStore> {
    let ttl = Duration::from_secs(cli.ttl_minutes.saturating_mul(60));
    Ok(CacheStore::open(cache_medium(cli)?).with_default_ttl(ttl))
}

fn github_client() -> anyhow::Result<GitHubClient> {
    let client = GitHubClient::from_env()?;
    Ok(match std::env::var("GITHUB_API_URL") {
        Ok(url) if !url.trim().is_empty() => client.with_base_url(&url),
        _ => client,
    })
}

fn open_controller(cli: &Cli, repo: &str) -> anyhow::Result<RepositoryDataController> {
    let repo = RepoId::parse(repo)?;
    let mut controller = RepositoryDataController::new(open_cache(cli)?);
    controller.open_repository(repo, &cli.branch);
    Ok(controller)
}

fn run_explorer(cli: &Cli, repo: &str) -> anyhow::Result<()> {
    let controller = open_controller(cli, repo)?;
    let mut app = App::new(controller, github_client()?);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result.context("terminal error")
}

async fn print_tree(cli: &Cli, repo: &str) -> anyhow::Result<()> {
    let mut controller = open_controller(cli, repo)?;
    let mut client = github_client()?;
    controller.load_structure(&mut client).await?;

    if let Some(message) = controller.structure().error() {
        bail!("{}", message);
    }
    if let Some(warning) = controller.warning() {
        eprintln!("⚠️  {}", warning);
    }

    let entries = controller.entries().unwrap_or_default();
    let root = tree::build_tree(entries);
    for row in tree::visible_rows(&root, |_| true) {
        let suffix = if row.is_directory() { "/" } else { "" };
        println!("{}{}{}", "  ".repeat(row.depth), row.name, suffix);
    }

    let counts = root.count();
    eprintln!("{} files, {} folders", counts.files, counts.directories);
    Ok(())
}

async fn print_branches(cli: &Cli, repo: &str) -> anyhow::Result<()> {
    let mut controller = open_controller(cli, repo)?;
    let mut client = github_client()?;
    controller.load_branches(&mut client).await?;

    if let Some(message) = controller.branches().error() {
        bail!("{}", message);
    }
    for branch in controller.branches().data().into_iter().flatten() {
        let marker = if branch.name == controller.branch() { "*" } else { " " };
        println!("{} {}  {}", marker, branch.name, branch.commit_identity());
    }
    Ok(())
}

async fn print_file(cli: &Cli, repo: &str, path: &str) -> anyhow::Result<()> {
    let mut controller = open_controller(cli, repo)?;
    let mut client = github_client()?;
    controller.load_content(&mut client, path).await?;

    if let Some(message) = controller.content().error() {
        bail!("{}", message);
    }
    if let Some(view) = controller.content().data() {
        print!("{}", view.content);
    }
    Ok(())
}

fn clear_cache(cli: &Cli) -> anyhow::Result<()> {
    let mut controller = RepositoryDataController::new(open_cache(cli)?);
    let count = controller.cache().len();
    controller.clear_cache();
    println!("✓ Cleared {} cached responses", count);
    Ok(())
}
