//! Command-line interface.
//!
//! With no subcommand the API server is started. `seed` replaces the contents
//! of the configured database with the integration-test fixtures.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::db;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "blogwire")]
#[command(author, version, about = "A small blog-posting API", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "blogwire.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Clear users and blogs and insert fixture data
    Seed,
}

/// Run the `seed` subcommand against the configured database
pub async fn run_seed(config: &Config) -> Result<()> {
    info!("Using database URL: {}", config.database.url);
    let pool = db::init(&config.database).await?;

    let summary = db::seed_fixtures(&pool).await?;
    pool.close().await;

    info!(
        users = summary.users,
        blogs = summary.blogs,
        "Database seeded and connection closed"
    );
    Ok(())
}
