//! Skate shop CLI - Database migrations, synchronization and activity log.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! skate-cli migrate
//!
//! # Synchronize everything from Shopify
//! skate-cli sync
//!
//! # Synchronize promotions only
//! skate-cli sync --kind promotions
//!
//! # Inspect the activity log
//! skate-cli activity list --limit 20
//! skate-cli activity stats --hours 24
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "skate-cli")]
#[command(author, version, about = "Skate shop admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Synchronize Shopify data into the local database
    Sync {
        /// Entity kind to synchronize (repeatable; defaults to all kinds)
        #[arg(short, long = "kind")]
        kinds: Vec<String>,
    },
    /// Inspect the activity log
    Activity {
        #[command(subcommand)]
        action: ActivityAction,
    },
}

#[derive(Subcommand)]
enum ActivityAction {
    /// List recent entries
    List {
        /// Entity kind (`products`, `collections`, `customers`, `orders`, `promotions`)
        #[arg(short, long)]
        kind: Option<String>,

        /// Outcome (`success`, `warning`, `error`)
        #[arg(short, long)]
        outcome: Option<String>,

        /// Maximum number of entries (capped at 100)
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
    /// Show aggregate statistics
    Stats {
        /// Only include the last N hours
        #[arg(long)]
        hours: Option<i64>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Sync { kinds } => commands::sync::run(&kinds).await?,
        Commands::Activity { action } => match action {
            ActivityAction::List {
                kind,
                outcome,
                limit,
            } => commands::activity::list(kind.as_deref(), outcome.as_deref(), limit).await?,
            ActivityAction::Stats { hours } => commands::activity::stats(hours).await?,
        },
    }
    Ok(())
}
