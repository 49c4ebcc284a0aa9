//! Shipment entities: the record external agents act on.

pub mod document;
pub mod field;
pub mod model;
pub mod status;

pub use document::{CreateDocument, ShipmentDocument};
pub use field::{CostField, DateField, FieldBucket, FieldUpdate, NamedField, ShipmentField};
pub use model::{Shipment, ShipmentChange};
pub use status::ShipmentStatus;
