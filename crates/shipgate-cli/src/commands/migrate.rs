//! Database migration management commands.

use anyhow::Context;
use clap::{Args, Subcommand};

use shipgate_core::config::AppConfig;
use shipgate_database::migration::run_migrations;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> anyhow::Result<()> {
    let stores = super::connect_stores(config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(stores.pool.pool())
                .await
                .context("Migration failed")?;
            output::print_success("All migrations applied successfully.");
        }
    }

    stores.pool.close().await;
    Ok(())
}
