//! Shared utilities: percentiles, great-circle distance, address classification.

pub mod geo;
pub mod ip_utils;
pub mod percentile;

pub use geo::{great_circle_distance_km, GeoPoint};
pub use ip_utils::{AddressClassifier, AddressPolicy, ParsedPrivateRanges, Rfc1918Pattern};
pub use percentile::percentile;
