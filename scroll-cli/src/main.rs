//! # backscroll
//!
//! CLI tool for exercising a backscroll window against an in-memory store.
//!
//! ## Commands
//!
//! - `history`: Page backward until the start of history
//! - `follow`: Load the newest page, then follow live inserts
//!
//! ## Example
//!
//! ```bash
//! # Page through 100 generated entries
//! backscroll history --generate 100
//!
//! # Page through entries from a JSON file with custom page sizes
//! backscroll --config backscroll.toml history --seed entries.json
//!
//! # Append 5 live entries, one every 200ms
//! backscroll follow --generate 20 --live 5 --interval-ms 200
//! ```

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::{follow, history};

/// CLI tool for exercising a backscroll window.
#[derive(Parser, Debug)]
#[command(name = "backscroll")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file (paging and follower settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Page backward until the start of history
    History {
        /// JSON file with an array of {"key", "value"} entries
        #[arg(long, short, conflicts_with = "generate")]
        seed: Option<PathBuf>,

        /// Number of sequential entries to generate
        #[arg(long, short, default_value_t = 100)]
        generate: u64,
    },

    /// Load the newest page, then append live entries
    Follow {
        /// Number of sequential entries present before following
        #[arg(long, short, default_value_t = 20)]
        generate: u64,

        /// Number of live entries to insert
        #[arg(long, short)]
        live: u64,

        /// Delay between live inserts
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::History { seed, generate } => {
            let store = match seed {
                Some(path) => commands::seeded_store(&path).await?,
                None => commands::generated_store(generate),
            };
            history::run(store, config).await?;
        }
        Commands::Follow {
            generate,
            live,
            interval_ms,
        } => {
            follow::run(generate, live, interval_ms, config).await?;
        }
    }

    Ok(())
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}
