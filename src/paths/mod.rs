//! Path reconstruction, RTT aggregation and path selection.
//!
//! Records are turned into `(path, rtt)` samples, the samples are grouped
//! per path and reduced to a low percentile, and finally only the paths that
//! end at the first public address reached by a probe are kept.

pub mod aggregate;
pub mod filter;
pub mod reconstruct;
pub mod types;

pub use aggregate::{aggregate_records, reduce_samples, RttAggregator, DEFAULT_PERCENTILE};
pub use filter::{filter_paths, is_first_public_hop};
pub use reconstruct::{reconstruct, PathSamples};
pub use types::{FilteredPaths, PathKey, PathRttSamples, ReducedPaths};
