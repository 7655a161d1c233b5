//! # Casework CLI (`casework`)
//!
//! Creates the database, imports Markdown content, runs case-study searches
//! from the terminal, and starts the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! casework --config ./config/casework.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `casework init` | Create the SQLite database and schema |
//! | `casework import` | Import case studies and blog posts from the content directory |
//! | `casework search "<query>"` | Search published case studies |
//! | `casework serve` | Start the HTTP API |
//!
//! Logging goes to stderr. `RUST_LOG` overrides `-v`/`-q`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use casework::search::SearchArgs;
use casework::{config, import, migrate, search, server};

/// Casework: case-study search, blog listings, and job postings for a
/// consulting firm's website.
#[derive(Parser)]
#[command(name = "casework", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/casework.toml")]
    config: PathBuf,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Import Markdown content into the database.
    ///
    /// Files under `case-studies/` become case studies and files under
    /// `blog/` become blog posts. Files whose content hash is unchanged
    /// since the last import are skipped.
    Import {
        /// Parse and validate everything without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Search published case studies.
    Search {
        /// Fuzzy query text. Omit to list by filters only.
        query: Option<String>,

        #[arg(long)]
        industry: Option<String>,

        #[arg(long)]
        client_size: Option<String>,

        #[arg(long)]
        use_case: Option<String>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<String>,

        /// Print the same JSON the HTTP endpoint returns.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { dry_run } => {
            import::run_import(&cfg, dry_run).await?;
        }
        Commands::Search {
            query,
            industry,
            client_size,
            use_case,
            limit,
            json,
        } => {
            search::run_search(
                &cfg,
                SearchArgs {
                    query,
                    industry,
                    client_size,
                    use_case,
                    limit,
                    json,
                },
            )
            .await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
