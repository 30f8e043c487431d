//! Output of a plausibility run.
//!
//! Findings are printed as plain text lines while the run progresses; a JSON
//! report with every finding can be written in addition.

use std::fs;
use std::io::Write;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths::{PathKey, ReducedPaths};
use crate::pipeline::{EvaluationSummary, PathFinding};
use crate::plausibility::Verdict;

/// Header line for a finding: reduced RTT followed by the path
pub fn path_line(rtt_ms: f64, path: &PathKey) -> String {
    format!("{} {}", rtt_ms, path)
}

/// Classification line for a finding
pub fn verdict_line(finding: &PathFinding) -> String {
    match finding.verdict {
        Verdict::Good { .. } => "GOOD".to_string(),
        Verdict::Wrong { distance_km, probe } => format!(
            "WRONG {} is probably not {:.1} km away from {}",
            finding.address(),
            distance_km,
            probe
        ),
        Verdict::New { suggestion } => {
            format!("NEW {} is probably near {}", finding.address(), suggestion)
        }
    }
}

/// Final line: number of reduced paths and number of selected paths
pub fn summary_line(total_paths: usize, filtered_paths: usize) -> String {
    format!("{} {}", total_paths, filtered_paths)
}

/// Write both lines of a finding
pub fn write_finding<W: Write>(out: &mut W, finding: &PathFinding) -> Result<()> {
    writeln!(out, "{}", path_line(finding.rtt_ms, &finding.path))?;
    writeln!(out, "{}", verdict_line(finding))?;
    Ok(())
}

/// Write every selected path with its RTT, without classifying it
pub fn write_paths<W: Write>(out: &mut W, paths: &[PathKey], reduced: &ReducedPaths) -> Result<()> {
    for path in paths {
        if let Some(rtt) = reduced.get(path) {
            writeln!(out, "{}", path_line(*rtt, path))?;
        }
    }
    writeln!(out, "{}", summary_line(reduced.len(), paths.len()))?;
    Ok(())
}

/// Run information stored alongside the findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub input: String,
    pub percentile: f64,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub metadata: ReportMetadata,
    pub summary: EvaluationSummary,
    pub findings: Vec<PathFinding>,
}

impl CheckReport {
    pub fn new(input: impl Into<String>, percentile: f64) -> Self {
        Self {
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                input: input.into(),
                percentile,
            },
            summary: EvaluationSummary::default(),
            findings: Vec::new(),
        }
    }
}

/// Generate JSON report
pub fn generate_json_report(report: &CheckReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::geo::GeoPoint;

    fn finding(verdict: Verdict) -> PathFinding {
        PathFinding {
            path: PathKey::new(1, ["10.0.0.1", "8.8.8.8"]),
            rtt_ms: 4.5,
            verdict,
        }
    }

    #[test]
    fn test_finding_lines() {
        let mut out = Vec::new();
        write_finding(&mut out, &finding(Verdict::Good { distance_km: 1.0 })).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "4.5 (1, 10.0.0.1, 8.8.8.8)\nGOOD\n");
    }

    #[test]
    fn test_wrong_line() {
        let f = finding(Verdict::Wrong {
            distance_km: 5611.84,
            probe: GeoPoint::new(50.0, 8.0),
        });
        assert_eq!(
            verdict_line(&f),
            "WRONG 8.8.8.8 is probably not 5611.8 km away from 50 8"
        );
    }

    #[test]
    fn test_wrong_distance_rounds_to_one_decimal() {
        let f = finding(Verdict::Wrong {
            distance_km: 5611.86,
            probe: GeoPoint::new(50.0, 8.0),
        });
        assert_eq!(
            verdict_line(&f),
            "WRONG 8.8.8.8 is probably not 5611.9 km away from 50 8"
        );

        // JSON keeps the unrounded distance
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["distance_km"], 5611.86);
    }

    #[test]
    fn test_new_line() {
        let f = finding(Verdict::New {
            suggestion: GeoPoint::new(52.5, 13.4),
        });
        assert_eq!(verdict_line(&f), "NEW 8.8.8.8 is probably near 52.5 13.4");
    }

    #[test]
    fn test_write_paths_with_summary() {
        let mut reduced = ReducedPaths::new();
        let kept = PathKey::new(2, ["9.9.9.9"]);
        reduced.insert(kept.clone(), 3.25);
        reduced.insert(PathKey::new(2, ["10.0.0.1"]), 1.0);

        let mut out = Vec::new();
        write_paths(&mut out, &[kept], &reduced).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3.25 (2, 9.9.9.9)\n2 1\n");
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = CheckReport::new("tr.txt", 5.0);
        report.findings.push(finding(Verdict::New {
            suggestion: GeoPoint::new(1.0, 2.0),
        }));
        generate_json_report(&report, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["input"], "tr.txt");
        assert_eq!(value["findings"][0]["classification"], "NEW");
        assert_eq!(value["findings"][0]["path"]["probe_id"], 1);
    }
}
