//! Stable path reconstruction from a single traceroute record.
//!
//! Hops are walked in ascending hop order while a base path (probe, then one
//! address per agreeing hop) grows. Every reply with both an RTT and an
//! origin yields a sample for `base + origin`. As soon as a hop's replies
//! disagree on their origin the route is considered multi-pathed and the
//! remaining hops of the record are ignored; samples of the disagreeing hop
//! itself are still produced.

use crate::measurement::{HopResult, MeasurementRecord, ProbeId, Reply};

use super::types::PathKey;

/// Lazy sequence of `(path, rtt)` samples for one record
pub struct PathSamples<'a> {
    probe_id: ProbeId,
    hops: std::vec::IntoIter<&'a HopResult>,
    base: Vec<String>,
    pending: std::vec::IntoIter<(PathKey, f64)>,
    halted: bool,
}

/// Walk a record's hops and yield one sample per usable reply
pub fn reconstruct(record: &MeasurementRecord) -> PathSamples<'_> {
    let mut hops: Vec<&HopResult> = record.hops.iter().collect();
    // Input order is not guaranteed
    hops.sort_by_key(|hop| hop.hop_index);

    PathSamples {
        probe_id: record.probe_id,
        hops: hops.into_iter(),
        base: Vec::new(),
        pending: Vec::new().into_iter(),
        halted: false,
    }
}

impl PathSamples<'_> {
    fn visit(&mut self, hop: &HopResult) -> Vec<(PathKey, f64)> {
        let samples = hop
            .replies
            .iter()
            .filter_map(Reply::sample)
            .map(|(from, rtt)| {
                let mut hops = self.base.clone();
                hops.push(from.to_string());
                (PathKey { probe_id: self.probe_id, hops }, rtt)
            })
            .collect();

        let mut origins = hop.origins();
        if let Some(first) = origins.next() {
            if origins.all(|origin| origin == first) {
                self.base.push(first.to_string());
            } else {
                log::trace!(
                    "probe {}: hop {} replies disagree, stopping",
                    self.probe_id,
                    hop.hop_index
                );
                self.halted = true;
            }
        }

        samples
    }
}

impl Iterator for PathSamples<'_> {
    type Item = (PathKey, f64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sample) = self.pending.next() {
                return Some(sample);
            }
            if self.halted {
                return None;
            }
            let hop = self.hops.next()?;
            self.pending = self.visit(hop).into_iter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::Reply;

    fn reply(from: &str, rtt: f64) -> Reply {
        Reply::new(Some(rtt), Some(from))
    }

    fn record(probe_id: ProbeId, hops: Vec<HopResult>) -> MeasurementRecord {
        MeasurementRecord { probe_id, hops }
    }

    #[test]
    fn test_unanimous_hops_extend_path() {
        let rec = record(
            1,
            vec![
                HopResult::new(1, vec![reply("A", 1.0), reply("A", 1.5)]),
                HopResult::new(2, vec![reply("B", 5.0)]),
            ],
        );
        let samples: Vec<_> = reconstruct(&rec).collect();

        assert_eq!(
            samples,
            vec![
                (PathKey::new(1, ["A"]), 1.0),
                (PathKey::new(1, ["A"]), 1.5),
                (PathKey::new(1, ["A", "B"]), 5.0),
            ]
        );
    }

    #[test]
    fn test_disagreeing_hop_stops_exploration() {
        let rec = record(
            1,
            vec![
                HopResult::new(1, vec![reply("A", 1.0), reply("B", 2.0)]),
                HopResult::new(2, vec![reply("C", 5.0)]),
            ],
        );
        let samples: Vec<_> = reconstruct(&rec).collect();

        assert_eq!(
            samples,
            vec![(PathKey::new(1, ["A"]), 1.0), (PathKey::new(1, ["B"]), 2.0)]
        );
    }

    #[test]
    fn test_hops_sorted_by_index() {
        let rec = record(
            7,
            vec![
                HopResult::new(2, vec![reply("B", 5.0)]),
                HopResult::new(1, vec![reply("A", 1.0)]),
            ],
        );
        let paths: Vec<_> = reconstruct(&rec).map(|(p, _)| p).collect();
        assert_eq!(paths, vec![PathKey::new(7, ["A"]), PathKey::new(7, ["A", "B"])]);
    }

    #[test]
    fn test_empty_hop_is_transparent() {
        let rec = record(
            1,
            vec![
                HopResult::new(1, vec![reply("A", 1.0)]),
                HopResult::new(2, vec![Reply::default(), Reply::default()]),
                HopResult::new(3, vec![]),
                HopResult::new(4, vec![reply("B", 9.0)]),
            ],
        );
        let samples: Vec<_> = reconstruct(&rec).collect();
        assert_eq!(
            samples,
            vec![(PathKey::new(1, ["A"]), 1.0), (PathKey::new(1, ["A", "B"]), 9.0)]
        );
    }

    #[test]
    fn test_origin_without_rtt_still_extends() {
        let rec = record(
            1,
            vec![
                HopResult::new(1, vec![Reply::new(None, Some("A"))]),
                HopResult::new(2, vec![reply("B", 4.0)]),
            ],
        );
        let samples: Vec<_> = reconstruct(&rec).collect();
        assert_eq!(samples, vec![(PathKey::new(1, ["A", "B"]), 4.0)]);
    }

    #[test]
    fn test_timeouts_do_not_count_as_disagreement() {
        let rec = record(
            1,
            vec![
                HopResult::new(1, vec![Reply::default(), reply("A", 1.0), Reply::new(Some(2.0), None)]),
                HopResult::new(2, vec![reply("B", 3.0)]),
            ],
        );
        let paths: Vec<_> = reconstruct(&rec).map(|(p, _)| p).collect();
        assert_eq!(paths, vec![PathKey::new(1, ["A"]), PathKey::new(1, ["A", "B"])]);
    }

    #[test]
    fn test_reply_order_does_not_change_sample_set() {
        let forward = record(
            1,
            vec![
                HopResult::new(1, vec![reply("A", 1.0), reply("A", 2.0)]),
                HopResult::new(2, vec![reply("B", 5.0), reply("C", 6.0)]),
            ],
        );
        let backward = record(
            1,
            vec![
                HopResult::new(1, vec![reply("A", 2.0), reply("A", 1.0)]),
                HopResult::new(2, vec![reply("C", 6.0), reply("B", 5.0)]),
            ],
        );

        let mut a: Vec<_> = reconstruct(&forward).collect();
        let mut b: Vec<_> = reconstruct(&backward).collect();
        let by_key = |x: &(PathKey, f64), y: &(PathKey, f64)| x.0.cmp(&y.0).then(x.1.total_cmp(&y.1));
        a.sort_by(by_key);
        b.sort_by(by_key);
        assert_eq!(a, b);
    }

    #[test]
    fn test_paths_always_have_a_hop() {
        let rec = record(
            3,
            vec![
                HopResult::new(1, vec![reply("A", 1.0)]),
                HopResult::new(2, vec![reply("B", 2.0), reply("B", 2.5)]),
                HopResult::new(3, vec![reply("C", 3.0), reply("D", 3.1)]),
            ],
        );
        assert!(reconstruct(&rec).all(|(path, _)| path.len() >= 2));
    }
}
