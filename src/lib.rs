//! # Hopcheck - plausibility checks for router geolocation hints
//!
//! This library cross-references RIPE Atlas traceroute results with claimed
//! router locations (such as OpenIPMap hints) and flags the claims that are
//! physically impossible given the measured round-trip times.
//!
//! ## Overview
//!
//! Every traceroute record is walked hop by hop from its probe. As long as
//! the replies at a hop agree on their origin address the path is extended;
//! once they disagree the route is multi-pathed and the rest of the record
//! is ignored. RTT samples are collected per path and reduced to their 5th
//! percentile, which approximates the best-case latency of that path.
//!
//! Only paths that end at the first public address reached from a probe are
//! checked. If that address is claimed to be more than 50 km away from the
//! probe while the path RTT is below 100 ms, the claim is reported as
//! `WRONG`. Addresses without a claim get the probe's position as a `NEW`
//! suggestion.
//!
//! ## Architecture
//!
//! - `measurement`: record types and the line-delimited JSON reader
//! - `paths`: path reconstruction, RTT aggregation and path selection
//! - `plausibility`: the distance/RTT consistency test
//! - `lookup`: geolocation hint and probe location collaborators
//! - `checkpoint`: cache-or-compute storage for expensive stages
//! - `pipeline`: stage orchestration
//! - `report`: text and JSON output
//! - `config`, `config_loader`: YAML configuration and CLI overrides
//! - `utils`: percentiles, great-circle distance, address classification
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use hopcheck::checkpoint::NoCheckpoints;
//! use hopcheck::lookup::{FixedGeoHints, FixedProbes};
//! use hopcheck::measurement::RecordReader;
//! use hopcheck::pipeline::{self, ReductionSettings};
//! use hopcheck::plausibility::Thresholds;
//! use hopcheck::utils::{GeoPoint, Rfc1918Pattern};
//!
//! let settings = ReductionSettings { percentile: 5.0, progress_interval: 2500 };
//! let reduced = pipeline::reduced_paths(
//!     &NoCheckpoints,
//!     || Ok(RecordReader::open("tr_5010.txt".as_ref())?),
//!     settings,
//! )?;
//! let selected = pipeline::filtered_paths(&NoCheckpoints, &reduced, &Rfc1918Pattern)?;
//!
//! let hints = FixedGeoHints::new();
//! let probes = FixedProbes::new().with(1, GeoPoint::new(50.0, 8.0));
//! pipeline::evaluate_paths(&selected, &reduced, &hints, &probes, &Thresholds::default(), |finding| {
//!     println!("{} {}", finding.path, finding.verdict.label());
//!     Ok(())
//! })?;
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Modules define typed errors with `thiserror`; stage orchestration and the
//! binary use `color_eyre` for context-rich reports. Every error is fatal to
//! the run.

pub mod checkpoint;
pub mod config;
pub mod config_loader;
pub mod lookup;
pub mod measurement;
pub mod paths;
pub mod pipeline;
pub mod plausibility;
pub mod report;
pub mod utils;
