//! Shipment lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use shipgate_core::AppError;

/// Lifecycle status of a shipment.
///
/// The legal edges between these states are owned by the status transition
/// engine in `shipgate-service`; this type is only the vocabulary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "shipment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Being prepared by the tenant; not yet confirmed with the supplier.
    Draft,
    /// Confirmed with the supplier.
    Confirmed,
    /// Handed over to the carrier.
    Shipped,
    /// Moving between origin and destination.
    InTransit,
    /// Arrived at the destination port, awaiting customs.
    AtPort,
    /// Under customs processing.
    Customs,
    /// Released by customs.
    Cleared,
    /// Received at the tenant's warehouse.
    Received,
    /// Closed; no further changes.
    Closed,
}

impl ShipmentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [ShipmentStatus; 9] = [
        Self::Draft,
        Self::Confirmed,
        Self::Shipped,
        Self::InTransit,
        Self::AtPort,
        Self::Customs,
        Self::Cleared,
        Self::Received,
        Self::Closed,
    ];

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::InTransit => "in_transit",
            Self::AtPort => "at_port",
            Self::Customs => "customs",
            Self::Cleared => "cleared",
            Self::Received => "received",
            Self::Closed => "closed",
        }
    }

    /// Render a list of statuses for error messages.
    pub fn join(statuses: &[ShipmentStatus]) -> String {
        if statuses.is_empty() {
            return "none".to_string();
        }
        statuses
            .iter()
            .map(ShipmentStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Unknown shipment status '{s}'. Expected one of: {}",
                    Self::join(&Self::ALL)
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "in_transit".parse::<ShipmentStatus>().unwrap(),
            ShipmentStatus::InTransit
        );
        assert!("sailing".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        for status in ShipmentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(
            ShipmentStatus::join(&[ShipmentStatus::AtPort, ShipmentStatus::Customs]),
            "at_port, customs"
        );
        assert_eq!(ShipmentStatus::join(&[]), "none");
    }
}
