//! Shipment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use shipgate_core::types::{ShipmentId, TenantId};

use super::document::CreateDocument;
use super::field::{CostField, DateField, FieldUpdate, NamedField, ShipmentField, format_money};
use super::status::ShipmentStatus;

/// An import shipment as seen by the gateway.
///
/// Owned by the surrounding order-management system; the gateway reads it
/// and writes only through [`ShipmentChange`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: ShipmentId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Human-facing shipment reference (e.g. `IMP-2026-0042`).
    pub reference: String,
    /// Current lifecycle status.
    pub status: ShipmentStatus,
    /// Supplier display name.
    pub supplier_name: Option<String>,
    /// Port of loading.
    pub origin_port: Option<String>,
    /// Port of discharge.
    pub destination_port: Option<String>,

    /// Estimated departure.
    pub etd: Option<DateTime<Utc>>,
    /// Estimated arrival.
    pub eta: Option<DateTime<Utc>>,
    /// Actual departure.
    pub actual_departure: Option<DateTime<Utc>>,
    /// Actual arrival.
    pub actual_arrival: Option<DateTime<Utc>>,

    /// Freight cost.
    pub freight_cost: Option<f64>,
    /// Insurance cost.
    pub insurance_cost: Option<f64>,
    /// Customs duty.
    pub customs_duty: Option<f64>,
    /// Port charges.
    pub port_charges: Option<f64>,
    /// Inland transport cost.
    pub inland_transport_cost: Option<f64>,

    /// Bill of lading number.
    pub bl_number: Option<String>,
    /// Container number.
    pub container_number: Option<String>,
    /// Vessel name.
    pub vessel_name: Option<String>,
    /// Voyage number.
    pub voyage_number: Option<String>,
    /// Customs entry number.
    pub customs_entry_number: Option<String>,
    /// Carrier tracking number.
    pub tracking_number: Option<String>,

    /// Stamped when the shipment reaches `cleared`.
    pub customs_cleared_at: Option<DateTime<Utc>>,
    /// Stamped when the shipment reaches `received`.
    pub received_at: Option<DateTime<Utc>>,

    /// Append-only note journal, one line per entry.
    pub notes: Option<String>,

    /// When the shipment was created.
    pub created_at: DateTime<Utc>,
    /// When the shipment was last modified.
    pub updated_at: DateTime<Utc>,
}

/// A mutation to apply to a shipment together with its audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShipmentChange {
    /// Write a batch of already-authorized field values.
    Fields {
        /// Updates in request order.
        updates: Vec<FieldUpdate>,
    },
    /// Move to a new status.
    Status {
        /// The new status.
        to: ShipmentStatus,
        /// Stamp `customs_cleared_at` / `received_at` as a consequence.
        stamp_at: Option<DateTime<Utc>>,
        /// Journal line to append, if a note accompanied the change.
        note_line: Option<String>,
    },
    /// Append a journal line.
    Note {
        /// Fully formatted line.
        line: String,
    },
    /// Attach a document reference.
    Document {
        /// The document to attach.
        document: CreateDocument,
    },
}

impl Shipment {
    /// Current value of a scheduling date.
    pub fn date(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::Etd => self.etd,
            DateField::Eta => self.eta,
            DateField::ActualDeparture => self.actual_departure,
            DateField::ActualArrival => self.actual_arrival,
        }
    }

    /// Current value of a cost field.
    pub fn cost(&self, field: CostField) -> Option<f64> {
        match field {
            CostField::FreightCost => self.freight_cost,
            CostField::InsuranceCost => self.insurance_cost,
            CostField::CustomsDuty => self.customs_duty,
            CostField::PortCharges => self.port_charges,
            CostField::InlandTransportCost => self.inland_transport_cost,
        }
    }

    /// Current value of a named field.
    pub fn named(&self, field: NamedField) -> Option<&str> {
        match field {
            NamedField::BlNumber => self.bl_number.as_deref(),
            NamedField::ContainerNumber => self.container_number.as_deref(),
            NamedField::VesselName => self.vessel_name.as_deref(),
            NamedField::VoyageNumber => self.voyage_number.as_deref(),
            NamedField::CustomsEntryNumber => self.customs_entry_number.as_deref(),
            NamedField::TrackingNumber => self.tracking_number.as_deref(),
        }
    }

    /// Text rendering of a field's current value (audit "old value").
    pub fn field_text(&self, field: ShipmentField) -> Option<String> {
        match field {
            ShipmentField::Date(f) => self.date(f).map(|d| d.to_rfc3339()),
            ShipmentField::Cost(f) => self.cost(f).map(format_money),
            ShipmentField::Named(f) => self.named(f).map(str::to_string),
        }
    }

    /// Write a single typed field value.
    pub fn apply_update(&mut self, update: &FieldUpdate) {
        match update {
            FieldUpdate::Date { field, value } => {
                let slot = match field {
                    DateField::Etd => &mut self.etd,
                    DateField::Eta => &mut self.eta,
                    DateField::ActualDeparture => &mut self.actual_departure,
                    DateField::ActualArrival => &mut self.actual_arrival,
                };
                *slot = Some(*value);
            }
            FieldUpdate::Cost { field, value } => {
                let slot = match field {
                    CostField::FreightCost => &mut self.freight_cost,
                    CostField::InsuranceCost => &mut self.insurance_cost,
                    CostField::CustomsDuty => &mut self.customs_duty,
                    CostField::PortCharges => &mut self.port_charges,
                    CostField::InlandTransportCost => &mut self.inland_transport_cost,
                };
                *slot = Some(*value);
            }
            FieldUpdate::Named { field, value } => {
                let slot = match field {
                    NamedField::BlNumber => &mut self.bl_number,
                    NamedField::ContainerNumber => &mut self.container_number,
                    NamedField::VesselName => &mut self.vessel_name,
                    NamedField::VoyageNumber => &mut self.voyage_number,
                    NamedField::CustomsEntryNumber => &mut self.customs_entry_number,
                    NamedField::TrackingNumber => &mut self.tracking_number,
                };
                *slot = Some(value.clone());
            }
        }
    }

    /// Append one line to the note journal.
    pub fn append_note(&mut self, line: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{line}"),
            _ => line.to_string(),
        });
    }

    /// Apply a change in memory, mirroring what the SQL store does.
    ///
    /// Document attachments live in their own table and only bump
    /// `updated_at` here.
    pub fn apply_change(&mut self, change: &ShipmentChange, now: DateTime<Utc>) {
        match change {
            ShipmentChange::Fields { updates } => {
                for update in updates {
                    self.apply_update(update);
                }
            }
            ShipmentChange::Status {
                to,
                stamp_at,
                note_line,
            } => {
                self.status = *to;
                if let Some(at) = stamp_at {
                    match to {
                        ShipmentStatus::Cleared => self.customs_cleared_at = Some(*at),
                        ShipmentStatus::Received => self.received_at = Some(*at),
                        _ => {}
                    }
                }
                if let Some(line) = note_line {
                    self.append_note(line);
                }
            }
            ShipmentChange::Note { line } => self.append_note(line),
            ShipmentChange::Document { .. } => {}
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Shipment {
        let now = Utc::now();
        Shipment {
            id: ShipmentId::new(),
            tenant_id: TenantId::new(),
            reference: "IMP-2026-0001".to_string(),
            status: ShipmentStatus::Draft,
            supplier_name: None,
            origin_port: Some("CNSHA".to_string()),
            destination_port: Some("NLRTM".to_string()),
            etd: None,
            eta: None,
            actual_departure: None,
            actual_arrival: None,
            freight_cost: None,
            insurance_cost: None,
            customs_duty: None,
            port_charges: None,
            inland_transport_cost: None,
            bl_number: None,
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
    fn test_append_note_joins_lines() {
        let mut shipment = sample();
        shipment.append_note("first");
        shipment.append_note("second");
        assert_eq!(shipment.notes.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_status_change_stamps_cleared() {
        let mut shipment = sample();
        shipment.status = ShipmentStatus::Customs;
        let at = Utc::now();
        shipment.apply_change(
            &ShipmentChange::Status {
                to: ShipmentStatus::Cleared,
                stamp_at: Some(at),
                note_line: None,
            },
            at,
        );
        assert_eq!(shipment.status, ShipmentStatus::Cleared);
        assert_eq!(shipment.customs_cleared_at, Some(at));
        assert_eq!(shipment.received_at, None);
    }

    #[test]
    fn test_field_text_formats_money() {
        let mut shipment = sample();
        shipment.apply_update(&FieldUpdate::Cost {
            field: CostField::FreightCost,
            value: 100.0,
        });
        assert_eq!(
            shipment.field_text(ShipmentField::Cost(CostField::FreightCost)),
            Some("100.00".to_string())
        );
    }
}
