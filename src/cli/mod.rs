//! CLI module for Relation
//!
//! Provides commands:
//! - `serve`: Run the HTTP server (default)
//! - `backfill`: Embed intros that lack a vector
//! - `sync`: Re-embed one profile's facets
//! - `clusters`: Compute or read the intro clusters

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relation_core::DEFAULT_BACKFILL_LIMIT;
use serde::Serialize;

use crate::server::{drain_effects, init_services, load_config, AppState};

/// Relation founder directory CLI
#[derive(Parser, Debug)]
#[command(name = "relation")]
#[command(about = "Founder quiz, profile directory and intro matching")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Embed intros that have no vector yet
    Backfill {
        /// Maximum profiles to embed
        #[arg(long, default_value_t = DEFAULT_BACKFILL_LIMIT)]
        limit: usize,
        /// Re-embed every profile with an intro
        #[arg(long)]
        force: bool,
    },
    /// Re-embed one profile's intro, work and hobby
    Sync {
        /// Profile id
        profile_id: String,
    },
    /// Print intro clusters
    Clusters {
        /// Number of clusters (default: sqrt(n / 2))
        #[arg(long)]
        k: Option<usize>,
        /// Ignore the cache
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Commands::Serve) => crate::server::run().await,
        Some(command) => {
            let config = load_config().context("Failed to load configuration")?;
            let (state, _worker) = init_services(&config).await?;
            let outcome = run_command(&state, command).await;
            drain_effects(&state).await;
            outcome
        }
    }
}

async fn run_command(state: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Serve => Ok(()),
        Commands::Backfill { limit, force } => {
            let report = require_sync(state)?
                .backfill_intro(limit, force)
                .await
                .context("Backfill failed")?;
            print_json(&report)
        }
        Commands::Sync { profile_id } => {
            let report = require_sync(state)?
                .sync_profile(&profile_id)
                .await
                .with_context(|| format!("Sync failed for profile {profile_id}"))?;
            print_json(&report)
        }
        Commands::Clusters { k, force } => {
            let response = state
                .clusters
                .get(k, force)
                .await
                .context("Clustering failed")?;
            print_json(&response)
        }
    }
}

fn require_sync(state: &AppState) -> Result<&relation_core::FacetSync> {
    state
        .sync
        .as_deref()
        .context("No embedding provider configured (set OPENAI_API_KEY)")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
