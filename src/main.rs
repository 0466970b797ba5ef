mod cli;
mod commands;
mod error;
mod journal;
mod metadata;
mod notify;
mod stats;
mod store;
mod subscription;
mod types;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::journal::Journal;
use crate::notify::LogScheduler;
use crate::store::FileStore;
use crate::subscription::{EntitlementService, NoProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Cli::parse();

    let store = match args.data_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default_location(),
    };
    let journal = Journal::new(store);
    let scheduler = LogScheduler;

    let mut entitlements = EntitlementService::new(&journal, NoProvider);
    entitlements.initialize().await;
    notify::initialize_notifications(&journal, &scheduler).await;

    // Everything except `status` sits behind the entitlement gate.
    if !matches!(args.command, Command::Status)
        && !commands::ensure_access(&entitlements).await
    {
        return Ok(());
    }

    match args.command {
        Command::Status => commands::status(&entitlements).await?,
        Command::Checkin(args) => commands::checkin(&journal, args).await?,
        Command::Trends(args) => commands::trends(&journal, args).await?,
        Command::Challenge { command } => commands::challenge(&journal, command).await?,
        Command::Question { command } => commands::question(&journal, command).await?,
        Command::Notify { command } => commands::notify(&journal, &scheduler, command).await?,
    }

    Ok(())
}
