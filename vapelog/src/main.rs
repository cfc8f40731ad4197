//! vapelog - track products, sessions and effects from the terminal

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vapelog::{commands, Args};
use vapelog_common::config::{CompiledDefaults, RootFolderInitializer, RootFolderResolver};
use vapelog_common::db::init_database;
use vapelog_common::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new().with_cli_arg(args.root_folder.clone());
    let config = resolver.load_config();
    let log_level = config
        .log_level
        .unwrap_or_else(|| CompiledDefaults::for_current_platform().log_level);

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("vapelog={0},vapelog_common={0}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting vapelog v{}", env!("CARGO_PKG_VERSION"));

    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;
    let store = Arc::new(SqliteStore::new(pool.clone()));

    let mut stdout = std::io::stdout().lock();
    let result = commands::run(args.command, store, &mut stdout).await;

    pool.close().await;
    result
}
