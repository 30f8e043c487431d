//! External lookups consumed by the plausibility check.
//!
//! The check needs two facts per path: where the probe is, and where the
//! terminal address is claimed to be. Both come from outside services and
//! are modeled as traits so the pipeline can run against HTTP clients or
//! fixed in-memory tables.

pub mod fixed;
pub mod http;

use crate::measurement::ProbeId;
use crate::utils::geo::GeoPoint;

pub use fixed::{FixedGeoHints, FixedProbes};
pub use http::{AtlasMeasurementClient, AtlasProbeClient, EndpointConfig, OpenIpMapClient};

/// Errors raised by lookup collaborators. All of them abort the run.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Incomplete location for {subject}: {reason}")]
    IncompleteLocation { subject: String, reason: String },

    #[error("Unknown probe {0}")]
    UnknownProbe(ProbeId),
}

/// Source of claimed (hinted) locations for addresses
pub trait GeoHintSource {
    /// `Ok(None)` means the address has no claimed location yet
    fn claimed_location(&self, address: &str) -> Result<Option<GeoPoint>, LookupError>;
}

/// Source of probe positions
pub trait ProbeDirectory {
    fn probe_location(&self, probe_id: ProbeId) -> Result<GeoPoint, LookupError>;
}
