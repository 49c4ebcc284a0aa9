//! Capability set embedded in every external credential.

use serde::{Deserialize, Serialize};

use shipgate_core::AppError;

use crate::shipment::{NamedField, ShipmentStatus};

/// The bounded list of actions and fields a credential may exercise.
///
/// Allow-lists are typed, so a grant cannot name a field or status that
/// does not exist. A stored set that no longer parses (for instance after a
/// vocabulary change) is rejected by [`CapabilitySet::from_stored`] instead
/// of being partially honoured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitySet {
    /// May move the shipment through its lifecycle.
    #[serde(default)]
    pub can_change_status: bool,
    /// May attach document references.
    #[serde(default)]
    pub can_upload_documents: bool,
    /// May edit scheduling dates.
    #[serde(default)]
    pub can_edit_dates: bool,
    /// May edit (and therefore read) cost fields.
    #[serde(default)]
    pub can_edit_costs: bool,
    /// Target statuses this credential may move into. Empty means every
    /// globally legal transition.
    #[serde(default)]
    pub allowed_statuses: Vec<ShipmentStatus>,
    /// Named fields this credential may edit. Empty means none.
    #[serde(default)]
    pub allowed_fields: Vec<NamedField>,
}

impl CapabilitySet {
    /// Decode a capability set loaded from storage.
    pub fn from_stored(raw: &serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(raw.clone()).map_err(|e| {
            AppError::validation(format!(
                "Credential capability set is invalid and cannot be enforced: {e}"
            ))
        })
    }

    /// Encode for storage.
    pub fn to_stored(&self) -> serde_json::Value {
        serde_json::json!({
            "can_change_status": self.can_change_status,
            "can_upload_documents": self.can_upload_documents,
            "can_edit_dates": self.can_edit_dates,
            "can_edit_costs": self.can_edit_costs,
            "allowed_statuses": self.allowed_statuses,
            "allowed_fields": self.allowed_fields,
        })
    }

    /// Drop duplicate allow-list entries, keeping first occurrences.
    pub fn normalized(mut self) -> Self {
        let mut seen_statuses = Vec::with_capacity(self.allowed_statuses.len());
        self.allowed_statuses.retain(|s| {
            if seen_statuses.contains(s) {
                false
            } else {
                seen_statuses.push(*s);
                true
            }
        });
        let mut seen_fields = Vec::with_capacity(self.allowed_fields.len());
        self.allowed_fields.retain(|f| {
            if seen_fields.contains(f) {
                false
            } else {
                seen_fields.push(*f);
                true
            }
        });
        self
    }

    /// Whether the named field is in the allow-list.
    pub fn allows_field(&self, field: NamedField) -> bool {
        self.allowed_fields.contains(&field)
    }

    /// Whether the status is permitted by the credential-scoped allow-list.
    pub fn allows_status(&self, status: ShipmentStatus) -> bool {
        self.allowed_statuses.is_empty() || self.allowed_statuses.contains(&status)
    }
}
