//! Finite-state machine over the shipment lifecycle.
//!
//! ```text
//! draft -> confirmed -> shipped -> in_transit -> at_port -> customs
//!                                            \-----------> customs
//! customs -> cleared -> received -> closed
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;

use shipgate_core::error::AppError;
use shipgate_entity::credential::CapabilitySet;
use shipgate_entity::shipment::ShipmentStatus;

/// Why a requested status change was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionRejection {
    /// The credential may not change status at all.
    #[error("this access link may not change the shipment status")]
    NotGranted,
    /// Not a successor of the current status.
    #[error(
        "cannot move from {from} to {to}; legal next statuses: {}",
        ShipmentStatus::join(.legal)
    )]
    Illegal {
        /// Current status.
        from: ShipmentStatus,
        /// Requested status.
        to: ShipmentStatus,
        /// Legal successors of `from`.
        legal: Vec<ShipmentStatus>,
    },
    /// Legal globally but outside the credential's allow-list.
    #[error(
        "this access link may not move the shipment to {to}; permitted statuses: {}",
        ShipmentStatus::join(.permitted)
    )]
    NotPermitted {
        /// Requested status.
        to: ShipmentStatus,
        /// The credential's allow-list.
        permitted: Vec<ShipmentStatus>,
    },
}

impl From<TransitionRejection> for AppError {
    fn from(rejection: TransitionRejection) -> Self {
        match rejection {
            TransitionRejection::Illegal { .. } => {
                AppError::illegal_transition(rejection.to_string())
            }
            TransitionRejection::NotGranted | TransitionRejection::NotPermitted { .. } => {
                AppError::forbidden(rejection.to_string())
            }
        }
    }
}

/// Decides whether a status change is allowed. Holds no state; everything
/// it needs is in its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusTransitionEngine;

impl StatusTransitionEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self
    }

    /// The fixed successor set of a status.
    pub fn successors(&self, status: ShipmentStatus) -> &'static [ShipmentStatus] {
        use ShipmentStatus::*;
        match status {
            Draft => &[Confirmed],
            Confirmed => &[Shipped],
            Shipped => &[InTransit],
            InTransit => &[AtPort, Customs],
            AtPort => &[Customs],
            Customs => &[Cleared],
            Cleared => &[Received],
            Received => &[Closed],
            Closed => &[],
        }
    }

    /// Statuses this credential could move the shipment to right now.
    pub fn available(&self, current: ShipmentStatus, caps: &CapabilitySet) -> Vec<ShipmentStatus> {
        if !caps.can_change_status {
            return Vec::new();
        }
        self.successors(current)
            .iter()
            .copied()
            .filter(|s| caps.allows_status(*s))
            .collect()
    }

    /// Check a requested transition: capability, then global legality,
    /// then the credential's allow-list.
    pub fn attempt_transition(
        &self,
        current: ShipmentStatus,
        requested: ShipmentStatus,
        caps: &CapabilitySet,
    ) -> Result<(), TransitionRejection> {
        if !caps.can_change_status {
            return Err(TransitionRejection::NotGranted);
        }

        let legal = self.successors(current);
        if !legal.contains(&requested) {
            return Err(TransitionRejection::Illegal {
                from: current,
                to: requested,
                legal: legal.to_vec(),
            });
        }

        if !caps.allows_status(requested) {
            return Err(TransitionRejection::NotPermitted {
                to: requested,
                permitted: caps.allowed_statuses.clone(),
            });
        }

        Ok(())
    }

    /// Timestamp stamped automatically on reaching a status, if any.
    pub fn stamp_for(&self, status: ShipmentStatus, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        matches!(status, ShipmentStatus::Cleared | ShipmentStatus::Received).then_some(now)
    }
}
