//! Staff token minting.

use anyhow::Context;
use clap::Args;

use shipgate_auth::JwtEncoder;
use shipgate_core::config::AppConfig;
use shipgate_core::types::{TenantId, UserId};

use crate::output;

/// Arguments for the token command
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Staff identity the token is issued to
    #[command(flatten)]
    pub staff: super::StaffArgs,
    /// Display name embedded in the token
    #[arg(long)]
    pub name: Option<String>,
}

/// Issue a staff token signed with the configured secret
pub fn execute(args: &TokenArgs, config: &AppConfig) -> anyhow::Result<()> {
    let encoder = JwtEncoder::new(&config.auth);
    let (token, expires_at) = encoder
        .issue(
            UserId::from_uuid(args.staff.user),
            TenantId::from_uuid(args.staff.tenant),
            args.name.as_deref(),
        )
        .context("Failed to issue staff token")?;

    output::print_success("Staff token issued.");
    output::print_kv("Expires", &expires_at.to_rfc3339());
    println!("{token}");
    Ok(())
}
