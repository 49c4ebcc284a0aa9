//! Field-by-field enforcement of a credential's capability set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use shipgate_core::error::AppError;
use shipgate_core::result::AppResult;
use shipgate_entity::credential::CapabilitySet;
use shipgate_entity::shipment::{FieldBucket, FieldUpdate, Shipment, ShipmentField};

/// Maximum length of a journal note, in characters.
pub const MAX_NOTE_LEN: usize = 4000;

/// Why a requested action exceeds the capability set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    /// Scheduling dates are not granted.
    #[error("'{field}' is a scheduling date and this access link may not edit scheduling dates")]
    DatesNotGranted {
        /// Requested field.
        field: ShipmentField,
    },
    /// Costs are not granted.
    #[error("'{field}' is a cost field and this access link may not edit costs")]
    CostsNotGranted {
        /// Requested field.
        field: ShipmentField,
    },
    /// Named field outside the allow-list.
    #[error("'{field}' is not editable with this access link; editable fields: {permitted}")]
    FieldNotAllowed {
        /// Requested field.
        field: ShipmentField,
        /// Fields that are allowed, comma separated.
        permitted: String,
    },
    /// Name outside the editable vocabulary.
    #[error("'{name}' is not an editable field")]
    UnknownField {
        /// Name as supplied.
        name: String,
    },
    /// Document upload is not granted.
    #[error("this access link may not upload documents")]
    DocumentsNotGranted,
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        AppError::forbidden(denial.to_string())
    }
}

/// One before/after pair handed to the audit logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field written.
    pub field: ShipmentField,
    /// Value before the write.
    pub old_value: Option<String>,
    /// Value after the write.
    pub new_value: String,
}

/// An update batch that passed enforcement in full.
#[derive(Debug, Clone)]
pub struct AuthorizedBatch {
    /// Typed writes, in request order.
    pub updates: Vec<FieldUpdate>,
    /// Before/after pairs, in the same order.
    pub changes: Vec<FieldChange>,
}

impl AuthorizedBatch {
    /// Whether every field in the batch is a cost field.
    pub fn is_cost_only(&self) -> bool {
        self.changes
            .iter()
            .all(|c| c.field.bucket() == FieldBucket::Cost)
    }
}

/// Evaluates requested mutations against a capability set.
///
/// Stateless; every decision depends only on its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityEnforcer;

impl CapabilityEnforcer {
    /// Create an enforcer.
    pub fn new() -> Self {
        Self
    }

    /// Check one field against the bucket rules.
    pub fn authorize_field_update(
        &self,
        caps: &CapabilitySet,
        field: ShipmentField,
    ) -> Result<(), Denial> {
        match field {
            ShipmentField::Date(_) if caps.can_edit_dates => Ok(()),
            ShipmentField::Date(_) => Err(Denial::DatesNotGranted { field }),
            ShipmentField::Cost(_) if caps.can_edit_costs => Ok(()),
            ShipmentField::Cost(_) => Err(Denial::CostsNotGranted { field }),
            ShipmentField::Named(named) if caps.allows_field(named) => Ok(()),
            ShipmentField::Named(_) => Err(Denial::FieldNotAllowed {
                field,
                permitted: permitted_fields(caps),
            }),
        }
    }

    /// Authorize a whole update batch, all or nothing.
    ///
    /// Every key is resolved and checked before any value is parsed, so a
    /// denied field is reported as a denial even when its value is also
    /// malformed. `null` values are skipped.
    pub fn authorize_batch(
        &self,
        caps: &CapabilitySet,
        shipment: &Shipment,
        body: &Map<String, Value>,
    ) -> AppResult<AuthorizedBatch> {
        let mut accepted: Vec<(ShipmentField, &Value)> = Vec::with_capacity(body.len());

        for (name, raw) in body {
            let field = ShipmentField::from_wire(name).ok_or_else(|| Denial::UnknownField {
                name: name.clone(),
            })?;
            if raw.is_null() {
                continue;
            }
            if let Err(denial) = self.authorize_field_update(caps, field) {
                info!(field = %field, reason = %denial, "Field update denied");
                return Err(denial.into());
            }
            if accepted.iter().any(|(seen, _)| *seen == field) {
                return Err(AppError::validation(format!(
                    "'{field}' was supplied more than once"
                )));
            }
            accepted.push((field, raw));
        }

        if accepted.is_empty() {
            return Err(AppError::empty_request(
                "The request contains no fields to update",
            ));
        }

        let mut updates = Vec::with_capacity(accepted.len());
        let mut changes = Vec::with_capacity(accepted.len());
        for (field, raw) in accepted {
            let Some(update) = FieldUpdate::parse(field, raw)? else {
                continue;
            };
            changes.push(FieldChange {
                field,
                old_value: shipment.field_text(field),
                new_value: update.value_text(),
            });
            updates.push(update);
        }

        Ok(AuthorizedBatch { updates, changes })
    }

    /// Check that documents may be attached.
    pub fn authorize_document_upload(&self, caps: &CapabilitySet) -> Result<(), Denial> {
        if caps.can_upload_documents {
            Ok(())
        } else {
            Err(Denial::DocumentsNotGranted)
        }
    }

    /// Validate a journal note. Any valid credential may add notes.
    pub fn authorize_note(&self, text: &str) -> AppResult<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Note must not be empty"));
        }
        if text.chars().count() > MAX_NOTE_LEN {
            return Err(AppError::validation(format!(
                "Note must be at most {MAX_NOTE_LEN} characters"
            )));
        }
        Ok(text.to_string())
    }
}

fn permitted_fields(caps: &CapabilitySet) -> String {
    if caps.allowed_fields.is_empty() {
        return "none".to_string();
    }
    caps.allowed_fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
