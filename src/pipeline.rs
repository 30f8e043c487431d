//! Stage orchestration for a plausibility run.
//!
//! The run is a sequential batch:
//!
//! 1. records are decoded and reconstructed into per-path RTT samples,
//! 2. samples are reduced to one percentile RTT per path,
//! 3. paths ending at the first public address of a probe are selected,
//! 4. each selected path is checked against the claimed location of its
//!    terminal address.
//!
//! Stages 1-2 and 3 go through a [`CheckpointStore`], so a run can resume
//! from stored results without touching the raw input again. Lookups in
//! stage 4 are issued one path at a time and any failure aborts the run.

use color_eyre::eyre::{eyre, Context, Result};
use serde::{Deserialize, Serialize};

use crate::checkpoint::{CheckpointStore, FILTERED_PATHS_KEY, REDUCED_PATHS_KEY};
use crate::lookup::{GeoHintSource, ProbeDirectory};
use crate::measurement::{IngestError, MeasurementRecord};
use crate::paths::{aggregate_records, filter_paths, FilteredPaths, PathKey, ReducedPaths};
use crate::plausibility::{evaluate, Thresholds, Verdict};
use crate::utils::ip_utils::AddressClassifier;

/// Settings of the aggregation and reduction stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReductionSettings {
    pub percentile: f64,
    pub progress_interval: usize,
}

/// Build (or resume) the reduced per-path RTT table.
///
/// `open_input` is only called when no checkpoint exists.
pub fn reduced_paths<S, F, I>(store: &S, open_input: F, settings: ReductionSettings) -> Result<ReducedPaths>
where
    S: CheckpointStore,
    F: FnOnce() -> Result<I>,
    I: IntoIterator<Item = Result<MeasurementRecord, IngestError>>,
{
    store.get_or_compute(REDUCED_PATHS_KEY, || {
        let records = open_input()?;
        let aggregator = aggregate_records(records, settings.progress_interval)
            .wrap_err("Failed to ingest measurement records")?;

        log::info!(
            "Reducing {} paths to their {}th percentile RTT",
            aggregator.path_count(),
            settings.percentile
        );
        Ok(aggregator.reduce(settings.percentile))
    })
}

/// Select (or resume) the paths usable for location inference
pub fn filtered_paths<S>(
    store: &S,
    reduced: &ReducedPaths,
    classifier: &dyn AddressClassifier,
) -> Result<FilteredPaths>
where
    S: CheckpointStore,
{
    store.get_or_compute(FILTERED_PATHS_KEY, || {
        let filtered = filter_paths(reduced.keys(), classifier);
        log::info!("Selected {} of {} paths", filtered.len(), reduced.len());
        Ok(filtered)
    })
}

/// Result of checking one path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathFinding {
    pub path: PathKey,
    pub rtt_ms: f64,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl PathFinding {
    /// The address being judged
    pub fn address(&self) -> &str {
        self.path.terminal().unwrap_or_default()
    }
}

/// Counters over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_paths: usize,
    pub filtered_paths: usize,
    pub good: usize,
    pub wrong: usize,
    pub new: usize,
}

impl EvaluationSummary {
    fn record(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Good { .. } => self.good += 1,
            Verdict::Wrong { .. } => self.wrong += 1,
            Verdict::New { .. } => self.new += 1,
        }
    }
}

/// Look up both locations for every selected path and classify it.
///
/// Each finding is handed to `on_finding` as soon as it is known and is not
/// kept afterwards.
pub fn evaluate_paths<F>(
    paths: &[PathKey],
    reduced: &ReducedPaths,
    hints: &dyn GeoHintSource,
    probes: &dyn ProbeDirectory,
    thresholds: &Thresholds,
    mut on_finding: F,
) -> Result<EvaluationSummary>
where
    F: FnMut(&PathFinding) -> Result<()>,
{
    let mut summary = EvaluationSummary {
        total_paths: reduced.len(),
        filtered_paths: paths.len(),
        ..Default::default()
    };

    for path in paths {
        let rtt_ms = *reduced
            .get(path)
            .ok_or_else(|| eyre!("Path {} has no reduced RTT", path))?;
        let address = path
            .terminal()
            .ok_or_else(|| eyre!("Path {} has no terminal address", path))?;

        let claimed = hints
            .claimed_location(address)
            .wrap_err_with(|| format!("Geolocation hint lookup failed for {}", address))?;
        let probe = probes
            .probe_location(path.probe_id)
            .wrap_err_with(|| format!("Probe lookup failed for probe {}", path.probe_id))?;

        let finding = PathFinding {
            path: path.clone(),
            rtt_ms,
            verdict: evaluate(rtt_ms, probe, claimed, thresholds),
        };
        log::debug!("{} -> {}", finding.path, finding.verdict.label());

        summary.record(&finding.verdict);
        on_finding(&finding)?;
    }

    log::info!(
        "Checked {} paths: {} good, {} wrong, {} new",
        summary.filtered_paths,
        summary.good,
        summary.wrong,
        summary.new
    );
    Ok(summary)
}
