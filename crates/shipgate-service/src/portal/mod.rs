//! External portal: scoped reads and guarded writes on one shipment.

pub mod projection;
pub mod service;

pub use projection::{CostBreakdown, ShipmentProjection};
pub use service::{NewDocument, PortalService};
