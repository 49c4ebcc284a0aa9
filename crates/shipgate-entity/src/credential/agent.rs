//! External agent classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use shipgate_core::AppError;

/// Kind of party an external credential was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "agent_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Customs broker.
    Broker,
    /// Freight forwarder.
    Forwarder,
    /// Ocean or air carrier.
    Carrier,
    /// Trucking / rail from port to warehouse.
    InlandTransport,
    /// Port or terminal agent.
    PortAgent,
    /// Inspection body.
    Inspector,
}

impl AgentType {
    /// Return the agent type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broker => "broker",
            Self::Forwarder => "forwarder",
            Self::Carrier => "carrier",
            Self::InlandTransport => "inland_transport",
            Self::PortAgent => "port_agent",
            Self::Inspector => "inspector",
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "broker" => Ok(Self::Broker),
            "forwarder" => Ok(Self::Forwarder),
            "carrier" => Ok(Self::Carrier),
            "inland_transport" => Ok(Self::InlandTransport),
            "port_agent" => Ok(Self::PortAgent),
            "inspector" => Ok(Self::Inspector),
            _ => Err(AppError::validation(format!(
                "Invalid agent type: '{s}'. Expected one of: broker, forwarder, carrier, \
                 inland_transport, port_agent, inspector"
            ))),
        }
    }
}

/// Who an external credential speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Agent classification.
    pub agent_type: AgentType,
    /// Display name (company or person).
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

impl fmt::Display for AgentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.agent_type)
    }
}
