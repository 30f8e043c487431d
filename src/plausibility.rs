//! Physical consistency check between claimed locations and measured RTTs.
//!
//! A low RTT bounds how far away the first public hop can be. If the hop's
//! claimed location is far from the probe while the RTT is small, the claim
//! is considered wrong. Hops without a claimed location get the probe's
//! position as a suggestion.

use serde::{Deserialize, Serialize};

use crate::utils::geo::GeoPoint;

/// Distance above which a claim is suspicious, in kilometers
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
/// RTT below which the hop is assumed close to the probe, in milliseconds
pub const DEFAULT_MAX_RTT_MS: f64 = 100.0;

/// Thresholds of the plausibility test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_distance_km: f64,
    pub max_rtt_ms: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            max_rtt_ms: DEFAULT_MAX_RTT_MS,
        }
    }
}

/// Outcome of the check for one path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "classification", rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Claimed location is consistent with the RTT
    Good { distance_km: f64 },
    /// Claimed location is too far away for the observed RTT
    Wrong { distance_km: f64, probe: GeoPoint },
    /// No claimed location; the probe's position is suggested
    New { suggestion: GeoPoint },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Good { .. } => "GOOD",
            Verdict::Wrong { .. } => "WRONG",
            Verdict::New { .. } => "NEW",
        }
    }
}

/// Classify a path given its reduced RTT and the two locations
pub fn evaluate(
    rtt_ms: f64,
    probe: GeoPoint,
    claimed: Option<GeoPoint>,
    thresholds: &Thresholds,
) -> Verdict {
    let Some(claimed) = claimed else {
        return Verdict::New { suggestion: probe };
    };

    let distance_km = claimed.distance_km(&probe);
    if distance_km > thresholds.max_distance_km && rtt_ms < thresholds.max_rtt_ms {
        Verdict::Wrong { distance_km, probe }
    } else {
        Verdict::Good { distance_km }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_location_is_good() {
        let probe = GeoPoint::new(50.0, 8.0);
        let verdict = evaluate(5.0, probe, Some(GeoPoint::new(50.0, 8.0)), &Thresholds::default());
        assert_eq!(verdict.label(), "GOOD");
    }

    #[test]
    fn test_far_claim_with_low_rtt_is_wrong() {
        let probe = GeoPoint::new(50.0, 8.0);
        let verdict = evaluate(10.0, probe, Some(GeoPoint::new(0.0, 0.0)), &Thresholds::default());
        match verdict {
            Verdict::Wrong { distance_km, probe: p } => {
                assert!(distance_km > 5000.0);
                assert_eq!(p, probe);
            }
            other => panic!("expected WRONG, got {:?}", other),
        }
    }

    #[test]
    fn test_far_claim_with_high_rtt_is_good() {
        let probe = GeoPoint::new(50.0, 8.0);
        let verdict = evaluate(150.0, probe, Some(GeoPoint::new(0.0, 0.0)), &Thresholds::default());
        assert_eq!(verdict.label(), "GOOD");
    }

    #[test]
    fn test_thresholds_are_strict() {
        let t = Thresholds { max_distance_km: 50.0, max_rtt_ms: 100.0 };
        let probe = GeoPoint::new(0.0, 0.0);
        let far = GeoPoint::new(10.0, 0.0);
        // RTT exactly at the bound does not count as "close"
        assert_eq!(evaluate(100.0, probe, Some(far), &t).label(), "GOOD");
        assert_eq!(evaluate(99.9, probe, Some(far), &t).label(), "WRONG");
    }

    #[test]
    fn test_missing_claim_is_new() {
        let probe = GeoPoint::new(52.5, 13.4);
        assert_eq!(
            evaluate(3.0, probe, None, &Thresholds::default()),
            Verdict::New { suggestion: probe }
        );
    }
}
