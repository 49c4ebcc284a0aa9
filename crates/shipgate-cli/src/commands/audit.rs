//! Audit trail CLI commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use shipgate_core::config::AppConfig;
use shipgate_core::types::{PageRequest, ShipmentId};
use shipgate_entity::audit::AuditEntry;

use super::StaffArgs;
use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Staff identity the command acts as
    #[command(flatten)]
    pub staff: StaffArgs,

    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Show the audit trail of a shipment, newest first
    Trail {
        /// Shipment ID
        #[arg(long)]
        shipment: Uuid,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Entries per page
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    /// Time
    time: String,
    /// Origin
    origin: String,
    /// Actor
    actor: String,
    /// Action
    action: String,
    /// Field
    field: String,
    /// Change
    change: String,
    /// IP
    ip: String,
}

impl From<&AuditEntry> for AuditRow {
    fn from(e: &AuditEntry) -> Self {
        let change = match (&e.old_value, &e.new_value) {
            (None, None) => e.note.clone().unwrap_or_default(),
            (old, new) => format!(
                "{} -> {}",
                old.as_deref().unwrap_or("-"),
                new.as_deref().unwrap_or("-")
            ),
        };
        Self {
            time: e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            origin: format!("{:?}", e.origin).to_lowercase(),
            actor: e
                .actor()
                .map(|a| a.display_name())
                .unwrap_or_else(|| "-".to_string()),
            action: e.action.to_string(),
            field: e.field_name.clone().unwrap_or_else(|| "-".to_string()),
            change,
            ip: e.ip_address.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stores = super::connect_stores(config).await?;
    let ctx = args.staff.context();

    match &args.command {
        AuditCommand::Trail {
            shipment,
            page,
            limit,
        } => {
            let request = PageRequest::new(*page, *limit);
            let trail = stores
                .audit
                .trail(&ctx.scope, ShipmentId::from_uuid(*shipment), &request)
                .await
                .context("Failed to load audit trail")?;

            match format {
                OutputFormat::Json => output::print_json(&trail),
                OutputFormat::Table => {
                    let rows: Vec<AuditRow> = trail.items.iter().map(AuditRow::from).collect();
                    output::print_list(&rows, format);
                    println!(
                        "Page {} of {} ({} entries)",
                        trail.page, trail.total_pages, trail.total_items
                    );
                }
            }
        }
    }

    stores.pool.close().await;
    Ok(())
}
