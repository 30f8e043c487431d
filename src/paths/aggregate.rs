//! RTT aggregation per path and percentile reduction.

use rayon::prelude::*;

use crate::measurement::{IngestError, MeasurementRecord};
use crate::utils::percentile::percentile;

use super::reconstruct::reconstruct;
use super::types::{PathKey, PathRttSamples, ReducedPaths};

/// Percentile used to approximate a path's minimum achievable RTT
pub const DEFAULT_PERCENTILE: f64 = 5.0;

/// Collects RTT samples keyed by path over all records
#[derive(Debug, Default)]
pub struct RttAggregator {
    samples: PathRttSamples,
    records: usize,
}

impl RttAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, path: PathKey, rtt: f64) {
        self.samples.entry(path).or_default().push(rtt);
    }

    /// Reconstruct a record's paths and add every sample it yields
    pub fn add_record(&mut self, record: &MeasurementRecord) {
        for (path, rtt) in reconstruct(record) {
            self.add_sample(path, rtt);
        }
        self.records += 1;
    }

    pub fn records_seen(&self) -> usize {
        self.records
    }

    pub fn path_count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &PathRttSamples {
        &self.samples
    }

    /// Freeze the samples and reduce each path to its `p`-th percentile
    pub fn reduce(self, p: f64) -> ReducedPaths {
        reduce_samples(self.samples, p)
    }
}

/// Consume a record stream into per-path samples.
///
/// Stops at the first ingestion error. A progress line is logged every
/// `progress_interval` records (0 disables it).
pub fn aggregate_records<I>(records: I, progress_interval: usize) -> Result<RttAggregator, IngestError>
where
    I: IntoIterator<Item = Result<MeasurementRecord, IngestError>>,
{
    let mut aggregator = RttAggregator::new();

    for record in records {
        aggregator.add_record(&record?);

        if progress_interval > 0 && aggregator.records_seen() % progress_interval == 0 {
            log::info!(
                "Processed {} records, {} distinct paths so far",
                aggregator.records_seen(),
                aggregator.path_count()
            );
        }
    }

    log::info!(
        "Aggregated {} records into {} paths",
        aggregator.records_seen(),
        aggregator.path_count()
    );
    Ok(aggregator)
}

/// Reduce every path's samples independently to the `p`-th percentile.
///
/// Paths are independent, so the reduction runs on the rayon pool.
pub fn reduce_samples(samples: PathRttSamples, p: f64) -> ReducedPaths {
    samples
        .into_par_iter()
        .filter_map(|(path, rtts)| percentile(&rtts, p).map(|rtt| (path, rtt)))
        .collect()
}
