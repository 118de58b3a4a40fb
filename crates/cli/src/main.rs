//! Store Locator CLI - Database migrations and reports.
//!
//! # Usage
//!
//! ```bash
//! # Run locator database migrations
//! sl-cli migrate
//!
//! # Print customer ids with no order in the last 12 months
//! sl-cli stale --months 12
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `stale` - List stale customer ids

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sl-cli")]
#[command(author, version, about = "Store locator CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Print customer ids whose last order is older than the threshold
    Stale {
        /// Age threshold in months (invalid or non-positive values use 6)
        #[arg(short, long)]
        months: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so `stale` output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Stale { months } => {
            let mut stdout = std::io::stdout().lock();
            let count = commands::stale::run(months.as_deref(), &mut stdout).await?;
            tracing::info!(count, "Listed stale customer ids");
        }
    }
    Ok(())
}
