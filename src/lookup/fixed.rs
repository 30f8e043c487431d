//! In-memory lookup tables.

use std::collections::HashMap;

use super::{GeoHintSource, LookupError, ProbeDirectory};
use crate::measurement::ProbeId;
use crate::utils::geo::GeoPoint;

/// Claimed locations known up front; unknown addresses have no claim
#[derive(Debug, Clone, Default)]
pub struct FixedGeoHints {
    hints: HashMap<String, GeoPoint>,
}

impl FixedGeoHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: impl Into<String>, location: GeoPoint) -> Self {
        self.hints.insert(address.into(), location);
        self
    }
}

impl GeoHintSource for FixedGeoHints {
    fn claimed_location(&self, address: &str) -> Result<Option<GeoPoint>, LookupError> {
        Ok(self.hints.get(address).copied())
    }
}

/// Probe positions known up front; unknown probes are an error
#[derive(Debug, Clone, Default)]
pub struct FixedProbes {
    probes: HashMap<ProbeId, GeoPoint>,
}

impl FixedProbes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, probe_id: ProbeId, location: GeoPoint) -> Self {
        self.probes.insert(probe_id, location);
        self
    }
}

impl ProbeDirectory for FixedProbes {
    fn probe_location(&self, probe_id: ProbeId) -> Result<GeoPoint, LookupError> {
        self.probes
            .get(&probe_id)
            .copied()
            .ok_or(LookupError::UnknownProbe(probe_id))
    }
}
