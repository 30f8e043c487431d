//! Measurement ingestion.
//!
//! Decodes RIPE Atlas traceroute results (one JSON record per line) into
//! probe, hop and reply structures. Records are read-only once decoded.

pub mod ingest;
pub mod types;

pub use ingest::{records_from_str, IngestError, RecordReader};
pub use types::{HopResult, MeasurementRecord, ProbeId, Reply};
