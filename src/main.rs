//! todo-server
//!
//! A single-user to-do list served as a browser page and a JSON API,
//! persisted in SQLite.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use todo_server::cli::{Cli, Command};
use todo_server::config::{Config, ConfigLoader, ConfigPaths};
use todo_server::db::Database;
use todo_server::logging::{self, LogTarget};
use todo_server::web::{TodoServer, start_server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(config_path) = &cli.config {
        paths = paths.with_explicit_file(config_path);
    }
    let mut loader = ConfigLoader::load(paths)?;
    if let Some(path) = loader.config_path() {
        info!("Config: {}", path.display());
    }
    cli.apply_overrides(loader.config_mut());
    let config = loader.into_config();

    match cli.command {
        Some(Command::InitDb) => run_init_db(&config)?,
        Some(Command::Serve(_)) | None => run_server(&config).await?,
    }

    Ok(())
}

/// Create the schema. Run once before the first `serve`.
fn run_init_db(config: &Config) -> Result<()> {
    config.ensure_db_dir()?;

    let db_path = &config.server.db_path;
    let db = Database::open(db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    db.init_schema()?;

    println!("Database created at {}", db_path.display());
    Ok(())
}

/// Serve HTTP until Ctrl-C.
async fn run_server(config: &Config) -> Result<()> {
    info!("Starting todo-server v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.server.db_path);

    let db_path = &config.server.db_path;
    let db = Database::open_existing(db_path)
        .with_context(|| format!("Cannot serve from {}", db_path.display()))?;

    let server = start_server(
        TodoServer::new(Arc::new(db)),
        config.server.bind_addr(),
    )
    .await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");
    server.shutdown().await?;

    Ok(())
}
