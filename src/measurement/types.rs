//! Traceroute measurement records as published by RIPE Atlas.

use serde::{Deserialize, Deserializer, Serialize};

/// Integer identifier of an Atlas probe
pub type ProbeId = u64;

/// One traceroute run from one probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    #[serde(rename = "prb_id")]
    pub probe_id: ProbeId,
    #[serde(rename = "result")]
    pub hops: Vec<HopResult>,
}

/// The replies collected at one hop distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopResult {
    #[serde(rename = "hop")]
    pub hop_index: u32,
    /// Atlas omits `result` on error hops; those have no replies
    #[serde(rename = "result", default)]
    pub replies: Vec<Reply>,
}

/// A single reply (or timeout marker) at a hop
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    /// Round-trip time in milliseconds; absent or not a float means unusable
    #[serde(default, deserialize_with = "lenient_rtt", skip_serializing_if = "Option::is_none")]
    pub rtt: Option<f64>,
    /// Address the reply came from
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
}

impl Reply {
    pub fn new(rtt: Option<f64>, from_address: Option<&str>) -> Self {
        Self {
            rtt,
            from_address: from_address.map(str::to_string),
        }
    }

    /// RTT and origin, when both are usable
    pub fn sample(&self) -> Option<(&str, f64)> {
        match (&self.from_address, self.rtt) {
            (Some(from), Some(rtt)) => Some((from.as_str(), rtt)),
            _ => None,
        }
    }
}

impl HopResult {
    pub fn new(hop_index: u32, replies: Vec<Reply>) -> Self {
        Self { hop_index, replies }
    }

    /// Origin addresses of the replies that carry one, in arrival order
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.replies.iter().filter_map(|r| r.from_address.as_deref())
    }
}

/// Only JSON floats are RTT samples. Integers, strings and other values
/// map to `None`.
fn lenient_rtt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) if n.is_f64() => n.as_f64(),
        _ => None,
    }))
}
