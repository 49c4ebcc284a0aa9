//! The subset of a shipment an external credential may see.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shipgate_core::types::ShipmentId;
use shipgate_entity::credential::CapabilitySet;
use shipgate_entity::shipment::{Shipment, ShipmentDocument, ShipmentStatus};

use crate::transition::StatusTransitionEngine;

/// Cost fields, included only for credentials that may edit costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Ocean or air freight.
    pub freight_cost: Option<f64>,
    /// Cargo insurance.
    pub insurance_cost: Option<f64>,
    /// Import duty.
    pub customs_duty: Option<f64>,
    /// Terminal and port charges.
    pub port_charges: Option<f64>,
    /// Final-mile transport.
    pub inland_transport_cost: Option<f64>,
}

impl CostBreakdown {
    fn of(shipment: &Shipment) -> Self {
        Self {
            freight_cost: shipment.freight_cost,
            insurance_cost: shipment.insurance_cost,
            customs_duty: shipment.customs_duty,
            port_charges: shipment.port_charges,
            inland_transport_cost: shipment.inland_transport_cost,
        }
    }
}

/// Scoped view of a shipment, computed per request from the capability set.
///
/// Cost fields are flattened into the top level when present, so the wire
/// shape is one flat object either way.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentProjection {
    pub id: ShipmentId,
    pub reference: String,
    pub status: ShipmentStatus,
    pub supplier_name: Option<String>,
    pub origin_port: Option<String>,
    pub destination_port: Option<String>,
    pub etd: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub bl_number: Option<String>,
    pub container_number: Option<String>,
    pub vessel_name: Option<String>,
    pub voyage_number: Option<String>,
    pub customs_entry_number: Option<String>,
    pub tracking_number: Option<String>,
    pub customs_cleared_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub costs: Option<CostBreakdown>,
    /// Statuses this credential could move the shipment to next.
    pub allowed_next_statuses: Vec<ShipmentStatus>,
    pub documents: Vec<ShipmentDocument>,
}

impl ShipmentProjection {
    /// Project a shipment for a capability set.
    pub fn build(
        shipment: Shipment,
        documents: Vec<ShipmentDocument>,
        caps: &CapabilitySet,
        engine: &StatusTransitionEngine,
    ) -> Self {
        let costs = caps.can_edit_costs.then(|| CostBreakdown::of(&shipment));
        let allowed_next_statuses = engine.available(shipment.status, caps);
        Self {
            id: shipment.id,
            reference: shipment.reference,
            status: shipment.status,
            supplier_name: shipment.supplier_name,
            origin_port: shipment.origin_port,
            destination_port: shipment.destination_port,
            etd: shipment.etd,
            eta: shipment.eta,
            actual_departure: shipment.actual_departure,
            actual_arrival: shipment.actual_arrival,
            bl_number: shipment.bl_number,
            container_number: shipment.container_number,
            vessel_name: shipment.vessel_name,
            voyage_number: shipment.voyage_number,
            customs_entry_number: shipment.customs_entry_number,
            tracking_number: shipment.tracking_number,
            customs_cleared_at: shipment.customs_cleared_at,
            received_at: shipment.received_at,
            notes: shipment.notes,
            updated_at: shipment.updated_at,
            costs,
            allowed_next_statuses,
            documents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipgate_core::types::TenantId;

    fn shipment() -> Shipment {
        let now = Utc::now();
        Shipment {
            id: ShipmentId::new(),
            tenant_id: TenantId::new(),
            reference: "IMP-2026-0311".to_string(),
            status: ShipmentStatus::Customs,
            supplier_name: Some("Shenzhen Parts Co".to_string()),
            origin_port: Some("CNSZX".to_string()),
            destination_port: Some("NLRTM".to_string()),
            etd: None,
            eta: None,
            actual_departure: None,
            actual_arrival: None,
            freight_cost: Some(1200.0),
            insurance_cost: Some(75.5),
            customs_duty: None,
            port_charges: None,
            inland_transport_cost: None,
            bl_number: Some("MSCU1234567".to_string()),
            container_number: None,
            vessel_name: None,
            voyage_number: None,
            customs_entry_number: None,
            tracking_number: None,
            customs_cleared_at: None,
            received_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_costs_hidden_without_capability() {
        let projection = ShipmentProjection::build(
            shipment(),
            Vec::new(),
            &CapabilitySet::default(),
            &StatusTransitionEngine::new(),
        );
        let json = serde_json::to_value(&projection).unwrap();
        assert!(json.get("freight_cost").is_none());
        assert!(json.get("insurance_cost").is_none());
        assert_eq!(json["bl_number"], "MSCU1234567");
        assert_eq!(json["allowed_next_statuses"], serde_json::json!([]));
    }

    #[test]
    fn test_costs_flattened_with_capability() {
        let caps = CapabilitySet {
            can_edit_costs: true,
            can_change_status: true,
            ..CapabilitySet::default()
        };
        let projection = ShipmentProjection::build(
            shipment(),
            Vec::new(),
            &caps,
            &StatusTransitionEngine::new(),
        );
        let json = serde_json::to_value(&projection).unwrap();
        assert_eq!(json["freight_cost"], 1200.0);
        assert!(json["customs_duty"].is_null());
        assert_eq!(json["allowed_next_statuses"], serde_json::json!(["cleared"]));
    }
}
