//! The closed vocabulary of shipment fields that may be offered for
//! external edit, partitioned into three disjoint buckets.
//!
//! Bucket membership is a property of the type: a [`DateField`] can only
//! ever be checked against the scheduling-date capability, a [`CostField`]
//! against the cost capability, and a [`NamedField`] against the
//! credential's field allow-list.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shipgate_core::AppError;

/// Maximum length of a named text field value.
pub const MAX_NAMED_VALUE_LEN: usize = 255;

/// Scheduling-date fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Estimated time of departure.
    Etd,
    /// Estimated time of arrival.
    Eta,
    /// Actual departure.
    ActualDeparture,
    /// Actual arrival.
    ActualArrival,
}

impl DateField {
    /// Every scheduling-date field.
    pub const ALL: [DateField; 4] = [
        Self::Etd,
        Self::Eta,
        Self::ActualDeparture,
        Self::ActualArrival,
    ];

    /// Wire and column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Etd => "etd",
            Self::Eta => "eta",
            Self::ActualDeparture => "actual_departure",
            Self::ActualArrival => "actual_arrival",
        }
    }
}

/// Money fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostField {
    /// Ocean or air freight.
    FreightCost,
    /// Cargo insurance.
    InsuranceCost,
    /// Import duty.
    CustomsDuty,
    /// Terminal and port handling.
    PortCharges,
    /// Delivery from port to warehouse.
    InlandTransportCost,
}

impl CostField {
    /// Every cost field.
    pub const ALL: [CostField; 5] = [
        Self::FreightCost,
        Self::InsuranceCost,
        Self::CustomsDuty,
        Self::PortCharges,
        Self::InlandTransportCost,
    ];

    /// Wire and column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreightCost => "freight_cost",
            Self::InsuranceCost => "insurance_cost",
            Self::CustomsDuty => "customs_duty",
            Self::PortCharges => "port_charges",
            Self::InlandTransportCost => "inland_transport_cost",
        }
    }
}

/// Reference fields that a grant may unlock one by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedField {
    /// Bill of lading number.
    #[serde(alias = "blNumber")]
    BlNumber,
    /// Container number.
    #[serde(alias = "containerNumber")]
    ContainerNumber,
    /// Vessel name.
    #[serde(alias = "vesselName")]
    VesselName,
    /// Voyage number.
    #[serde(alias = "voyageNumber")]
    VoyageNumber,
    /// Customs entry / declaration number.
    #[serde(alias = "customsEntryNumber")]
    CustomsEntryNumber,
    /// Carrier tracking number.
    #[serde(alias = "trackingNumber")]
    TrackingNumber,
}

impl NamedField {
    /// Every named field.
    pub const ALL: [NamedField; 6] = [
        Self::BlNumber,
        Self::ContainerNumber,
        Self::VesselName,
        Self::VoyageNumber,
        Self::CustomsEntryNumber,
        Self::TrackingNumber,
    ];

    /// Wire and column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlNumber => "bl_number",
            Self::ContainerNumber => "container_number",
            Self::VesselName => "vessel_name",
            Self::VoyageNumber => "voyage_number",
            Self::CustomsEntryNumber => "customs_entry_number",
            Self::TrackingNumber => "tracking_number",
        }
    }
}

/// The bucket a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldBucket {
    /// Requires the scheduling-date capability.
    SchedulingDate,
    /// Requires the cost capability.
    Cost,
    /// Requires presence in the field allow-list.
    Named,
}

/// Any field offered for external edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShipmentField {
    /// Scheduling-date bucket.
    Date(DateField),
    /// Cost bucket.
    Cost(CostField),
    /// Named bucket.
    Named(NamedField),
}

impl ShipmentField {
    /// Wire and column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date(f) => f.as_str(),
            Self::Cost(f) => f.as_str(),
            Self::Named(f) => f.as_str(),
        }
    }

    /// The bucket this field is checked against.
    pub fn bucket(&self) -> FieldBucket {
        match self {
            Self::Date(_) => FieldBucket::SchedulingDate,
            Self::Cost(_) => FieldBucket::Cost,
            Self::Named(_) => FieldBucket::Named,
        }
    }

    /// Every editable field.
    pub fn all() -> impl Iterator<Item = ShipmentField> {
        DateField::ALL
            .into_iter()
            .map(Self::Date)
            .chain(CostField::ALL.into_iter().map(Self::Cost))
            .chain(NamedField::ALL.into_iter().map(Self::Named))
    }

    /// Resolve a wire key to a field.
    ///
    /// Both `snake_case` and `camelCase` spellings are accepted. Returns
    /// `None` for names outside the vocabulary; callers must treat that as
    /// a denial, never as a no-op.
    pub fn from_wire(name: &str) -> Option<ShipmentField> {
        Self::all().find(|field| field.as_str() == name || camel_case(field.as_str()) == name)
    }
}

impl fmt::Display for ShipmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    for (i, part) in snake.split('_').enumerate() {
        let mut chars = part.chars();
        if i > 0
            && let Some(first) = chars.next()
        {
            out.push(first.to_ascii_uppercase());
        }
        out.extend(chars);
    }
    out
}

/// A single typed field write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "bucket", rename_all = "snake_case")]
pub enum FieldUpdate {
    /// New value for a scheduling date.
    Date {
        /// Target field.
        field: DateField,
        /// Parsed value.
        value: DateTime<Utc>,
    },
    /// New value for a cost field.
    Cost {
        /// Target field.
        field: CostField,
        /// Amount in currency units.
        value: f64,
    },
    /// New value for a named reference field.
    Named {
        /// Target field.
        field: NamedField,
        /// Trimmed text.
        value: String,
    },
}

impl FieldUpdate {
    /// The field written by this update.
    pub fn field(&self) -> ShipmentField {
        match self {
            Self::Date { field, .. } => ShipmentField::Date(*field),
            Self::Cost { field, .. } => ShipmentField::Cost(*field),
            Self::Named { field, .. } => ShipmentField::Named(*field),
        }
    }

    /// Text rendering of the new value, as recorded in the audit trail.
    pub fn value_text(&self) -> String {
        match self {
            Self::Date { value, .. } => value.to_rfc3339(),
            Self::Cost { value, .. } => format_money(*value),
            Self::Named { value, .. } => value.clone(),
        }
    }

    /// Parse a raw JSON value for a known field.
    ///
    /// `null` yields `Ok(None)`: absent values are skipped, never treated as
    /// "clear to empty". Malformed values are validation failures.
    pub fn parse(field: ShipmentField, raw: &serde_json::Value) -> Result<Option<Self>, AppError> {
        if raw.is_null() {
            return Ok(None);
        }
        let update = match field {
            ShipmentField::Date(field) => {
                let text = raw.as_str().ok_or_else(|| {
                    AppError::validation(format!("{} must be a date string", field.as_str()))
                })?;
                Self::Date {
                    field,
                    value: parse_date(field.as_str(), text)?,
                }
            }
            ShipmentField::Cost(field) => {
                let value = raw.as_f64().ok_or_else(|| {
                    AppError::validation(format!("{} must be a number", field.as_str()))
                })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(AppError::validation(format!(
                        "{} must be a non-negative amount",
                        field.as_str()
                    )));
                }
                Self::Cost { field, value }
            }
            ShipmentField::Named(field) => {
                let text = raw
                    .as_str()
                    .ok_or_else(|| {
                        AppError::validation(format!("{} must be a string", field.as_str()))
                    })?
                    .trim();
                if text.is_empty() {
                    return Err(AppError::validation(format!(
                        "{} must not be empty",
                        field.as_str()
                    )));
                }
                if text.chars().count() > MAX_NAMED_VALUE_LEN {
                    return Err(AppError::validation(format!(
                        "{} must be at most {MAX_NAMED_VALUE_LEN} characters",
                        field.as_str()
                    )));
                }
                Self::Named {
                    field,
                    value: text.to_string(),
                }
            }
        };
        Ok(Some(update))
    }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(field: &str, text: &str) -> Result<DateTime<Utc>, AppError> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            AppError::validation(format!(
                "{field} must be an RFC 3339 timestamp or YYYY-MM-DD date, got '{text}'"
            ))
        })
}

/// Render an amount the way it appears in audit entries.
pub fn format_money(value: f64) -> String {
    format!("{value:.2}")
}
