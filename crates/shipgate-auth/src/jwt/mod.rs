//! Staff token encoding and decoding.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::StaffClaims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
