//! Path keys and the per-path RTT tables built from them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::measurement::ProbeId;

/// A forwarding path anchored at a probe.
///
/// Two paths are equal iff they start at the same probe and list exactly the
/// same address strings in the same order. Addresses are never normalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathKey {
    pub probe_id: ProbeId,
    pub hops: Vec<String>,
}

impl PathKey {
    pub fn new<S: Into<String>>(probe_id: ProbeId, hops: impl IntoIterator<Item = S>) -> Self {
        Self {
            probe_id,
            hops: hops.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of nodes including the probe itself
    pub fn len(&self) -> usize {
        self.hops.len() + 1
    }

    /// The address the path ends at
    pub fn terminal(&self) -> Option<&str> {
        self.hops.last().map(String::as_str)
    }

    /// Addresses strictly between the probe and the terminal address
    pub fn intermediates(&self) -> &[String] {
        match self.hops.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }
}

impl std::fmt::Display for PathKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.probe_id)?;
        for hop in &self.hops {
            write!(f, ", {}", hop)?;
        }
        write!(f, ")")
    }
}

/// Raw RTT samples per path, filled during a single aggregation pass
pub type PathRttSamples = HashMap<PathKey, Vec<f64>>;

/// One representative RTT per path, ordered by path
pub type ReducedPaths = BTreeMap<PathKey, f64>;

/// Paths usable for location inference
pub type FilteredPaths = Vec<PathKey>;
