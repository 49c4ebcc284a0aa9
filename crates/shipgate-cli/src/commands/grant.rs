//! External credential management commands.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use shipgate_auth::CredentialHasher;
use shipgate_core::config::AppConfig;
use shipgate_core::types::{CredentialId, ShipmentId};
use shipgate_entity::credential::{AgentType, CapabilitySet, ExternalCredential};
use shipgate_entity::shipment::{NamedField, ShipmentStatus};
use shipgate_service::{CreateGrantRequest, GrantService, IssuedGrant};

use super::StaffArgs;
use crate::output::{self, OutputFormat};

/// Arguments for grant commands
#[derive(Debug, Args)]
pub struct GrantArgs {
    /// Staff identity the command acts as
    #[command(flatten)]
    pub staff: StaffArgs,

    /// Grant subcommand
    #[command(subcommand)]
    pub command: GrantCommand,
}

/// Grant subcommands
#[derive(Debug, Subcommand)]
pub enum GrantCommand {
    /// Issue a credential for one shipment
    Create {
        /// Shipment to grant access to
        #[arg(long)]
        shipment: Uuid,
        /// Agent classification
        #[arg(long, value_parser = parse_agent_type)]
        agent_type: AgentType,
        /// Agent display name
        #[arg(long)]
        agent_name: String,
        /// Agent contact email
        #[arg(long)]
        email: Option<String>,
        /// Agent contact phone
        #[arg(long)]
        phone: Option<String>,
        /// Allow status changes
        #[arg(long)]
        can_change_status: bool,
        /// Allow document uploads
        #[arg(long)]
        can_upload_documents: bool,
        /// Allow date edits
        #[arg(long)]
        can_edit_dates: bool,
        /// Allow cost edits (and cost visibility)
        #[arg(long)]
        can_edit_costs: bool,
        /// Restrict status changes to these targets (repeatable)
        #[arg(long = "status", value_parser = parse_status)]
        statuses: Vec<ShipmentStatus>,
        /// Named fields the agent may edit (repeatable)
        #[arg(long = "field", value_parser = parse_named_field)]
        fields: Vec<NamedField>,
        /// Days until expiry
        #[arg(long)]
        expiry_days: Option<u32>,
    },
    /// List credentials for a shipment
    List {
        /// Shipment whose grants to list
        #[arg(long)]
        shipment: Uuid,
    },
    /// Revoke a credential
    Revoke {
        /// Credential ID
        id: Uuid,
    },
    /// Replace a credential's secret
    Rotate {
        /// Credential ID
        id: Uuid,
    },
}

/// Grant display row
#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    /// Credential ID
    id: String,
    /// Agent
    agent: String,
    /// Active flag
    active: String,
    /// Expiry
    expires: String,
    /// Successful authentications
    uses: i64,
    /// Last use
    last_used: String,
}

impl From<&ExternalCredential> for GrantRow {
    fn from(c: &ExternalCredential) -> Self {
        Self {
            id: c.id.to_string(),
            agent: format!("{} ({})", c.agent_name, c.agent_type),
            active: if c.is_active { "yes" } else { "revoked" }.to_string(),
            expires: c.expires_at.format("%Y-%m-%d %H:%M").to_string(),
            uses: c.use_count,
            last_used: c
                .last_used_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute grant commands
pub async fn execute(
    args: &GrantArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let stores = super::connect_stores(config).await?;
    let hasher = CredentialHasher::new(&config.auth.argon2).context("Invalid argon2 settings")?;
    let service = GrantService::new(
        stores.credentials.clone(),
        stores.shipments.clone(),
        Arc::clone(&stores.audit),
        hasher,
        config.portal.clone(),
    );
    let ctx = args.staff.context();

    match &args.command {
        GrantCommand::Create {
            shipment,
            agent_type,
            agent_name,
            email,
            phone,
            can_change_status,
            can_upload_documents,
            can_edit_dates,
            can_edit_costs,
            statuses,
            fields,
            expiry_days,
        } => {
            let request = CreateGrantRequest {
                agent_type: *agent_type,
                agent_name: agent_name.clone(),
                agent_email: email.clone(),
                agent_phone: phone.clone(),
                capabilities: CapabilitySet {
                    can_change_status: *can_change_status,
                    can_upload_documents: *can_upload_documents,
                    can_edit_dates: *can_edit_dates,
                    can_edit_costs: *can_edit_costs,
                    allowed_statuses: statuses.clone(),
                    allowed_fields: fields.clone(),
                },
                expiry_days: *expiry_days,
            };
            let issued = service
                .create(&ctx, ShipmentId::from_uuid(*shipment), request)
                .await
                .context("Failed to create grant")?;
            print_issued(&issued, format, "Grant created.");
        }
        GrantCommand::List { shipment } => {
            let grants = service
                .list(&ctx, ShipmentId::from_uuid(*shipment))
                .await
                .context("Failed to list grants")?;
            let rows: Vec<GrantRow> = grants.iter().map(GrantRow::from).collect();
            output::print_list(&rows, format);
        }
        GrantCommand::Revoke { id } => {
            let revoked = service
                .revoke(&ctx, CredentialId::from_uuid(*id))
                .await
                .context("Failed to revoke grant")?;
            match format {
                OutputFormat::Json => output::print_json(&revoked),
                OutputFormat::Table => {
                    output::print_success(&format!("Grant {} revoked.", revoked.id));
                }
            }
        }
        GrantCommand::Rotate { id } => {
            let issued = service
                .rotate(&ctx, CredentialId::from_uuid(*id))
                .await
                .context("Failed to rotate grant")?;
            print_issued(&issued, format, "Grant rotated. The previous token no longer works.");
        }
    }

    stores.pool.close().await;
    Ok(())
}

fn print_issued(issued: &IssuedGrant, format: OutputFormat, headline: &str) {
    match format {
        OutputFormat::Json => output::print_json(issued),
        OutputFormat::Table => {
            output::print_success(headline);
            output::print_kv("Credential", &issued.credential.id.to_string());
            output::print_kv("Shipment", &issued.credential.shipment_id.to_string());
            output::print_kv("Expires", &issued.credential.expires_at.to_rfc3339());
            output::print_kv("Token", &issued.token);
            output::print_kv("Portal URL", &issued.portal_url);
            output::print_warning("The token is shown once and cannot be retrieved again.");
        }
    }
}

fn parse_agent_type(s: &str) -> Result<AgentType, String> {
    s.parse::<AgentType>().map_err(|e| e.message)
}

fn parse_status(s: &str) -> Result<ShipmentStatus, String> {
    s.parse::<ShipmentStatus>().map_err(|e| e.message)
}

fn parse_named_field(s: &str) -> Result<NamedField, String> {
    NamedField::ALL
        .into_iter()
        .find(|f| f.as_str() == s)
        .ok_or_else(|| {
            let known: Vec<&str> = NamedField::ALL.iter().map(NamedField::as_str).collect();
            format!("unknown field '{s}'; expected one of: {}", known.join(", "))
        })
}
