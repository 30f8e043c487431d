//! Plausibility checker for router geolocation hints.
//!
//! Reads RIPE Atlas traceroute results, reduces them to per-path RTTs and
//! checks the claimed location of each probe's first public hop.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader, Cursor, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use env_logger::Env;
use log::info;

use hopcheck::checkpoint::Checkpoints;
use hopcheck::config::Config;
use hopcheck::config_loader::{self, CliOverrides};
use hopcheck::lookup::{AtlasMeasurementClient, AtlasProbeClient, OpenIpMapClient};
use hopcheck::measurement::RecordReader;
use hopcheck::pipeline::{self, ReductionSettings};
use hopcheck::report::{self, CheckReport};
use hopcheck::utils::AddressPolicy;

/// Plausibility checks for router geolocation hints using RIPE Atlas traceroutes
#[derive(Parser, Debug)]
#[command(name = "hopcheck", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to an optional YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory for stage checkpoints
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Always recompute every stage
    #[arg(long, global = true)]
    no_cache: bool,

    /// Percentile used to reduce each path's RTT samples
    #[arg(long, global = true)]
    percentile: Option<f64>,

    /// Private address policy (pattern or parsed)
    #[arg(long, global = true)]
    address_policy: Option<AddressPolicy>,

    /// Number of worker threads for the reduction (0 = auto-detect)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,
}

/// Where measurement records come from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Line-delimited traceroute results on disk
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Fetch the latest results of this Atlas measurement instead
    #[arg(short, long)]
    measurement: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the claimed locations of every probe's first public hop
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Also write all findings to this JSON file
        #[arg(long)]
        json_report: Option<PathBuf>,
    },

    /// Print the selected paths and their RTTs without any lookups
    Paths {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Download the latest results of a measurement as line-delimited JSON
    Fetch {
        /// Atlas measurement id
        #[arg(short, long)]
        measurement: u64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            log_level: self.log_level.clone(),
            cache_dir: self.cache_dir.clone(),
            no_cache: self.no_cache,
            percentile: self.percentile,
            address_policy: self.address_policy,
            threads: self.threads,
        }
    }
}

impl fmt::Display for InputArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.input, self.measurement) {
            (Some(path), _) => write!(f, "{}", path.display()),
            (None, Some(id)) => write!(f, "measurement {}", id),
            (None, None) => write!(f, "<none>"),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = config_loader::load_or_default(cli.config.as_deref())?;
    config_loader::apply_overrides(&mut config, &cli.overrides())?;

    env_logger::Builder::from_env(Env::default().default_filter_or(&config.general.log_level)).init();

    if config.general.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.general.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match &cli.command {
        Commands::Check { input, json_report } => run_check(&config, input, json_report.as_ref()),
        Commands::Paths { input } => run_paths(&config, input),
        Commands::Fetch { measurement, output } => run_fetch(&config, *measurement, output),
    }
}

fn run_check(config: &Config, input: &InputArgs, json_report: Option<&PathBuf>) -> Result<()> {
    info!("Checking geolocation hints against {}", input);

    let store = Checkpoints::new(config.cache.enabled, &config.cache.dir);
    let reduced = pipeline::reduced_paths(&store, || open_records(config, input), reduction_settings(config))?;
    let classifier = config.filter.address_policy.classifier();
    let selected = pipeline::filtered_paths(&store, &reduced, classifier.as_ref())?;

    let hints = OpenIpMapClient::new(&config.services.geohints)?;
    let probes = AtlasProbeClient::new(&config.services.probes)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut collected = json_report.map(|_| CheckReport::new(input.to_string(), config.reduction.percentile));

    let summary = pipeline::evaluate_paths(
        &selected,
        &reduced,
        &hints,
        &probes,
        &config.plausibility,
        |finding| {
            report::write_finding(&mut out, finding)?;
            if let Some(collected) = collected.as_mut() {
                collected.findings.push(finding.clone());
            }
            Ok(())
        },
    )?;
    writeln!(out, "{}", report::summary_line(summary.total_paths, summary.filtered_paths))?;

    if let (Some(path), Some(mut collected)) = (json_report, collected) {
        collected.summary = summary;
        report::generate_json_report(&collected, path)?;
    }

    Ok(())
}

fn run_paths(config: &Config, input: &InputArgs) -> Result<()> {
    let store = Checkpoints::new(config.cache.enabled, &config.cache.dir);
    let reduced = pipeline::reduced_paths(&store, || open_records(config, input), reduction_settings(config))?;
    let classifier = config.filter.address_policy.classifier();
    let selected = pipeline::filtered_paths(&store, &reduced, classifier.as_ref())?;

    let stdout = io::stdout();
    report::write_paths(&mut stdout.lock(), &selected, &reduced)
}

fn run_fetch(config: &Config, measurement: u64, output: &PathBuf) -> Result<()> {
    let client = AtlasMeasurementClient::new(&config.services.measurements)?;
    let body = client.fetch_latest(measurement)?;

    fs::write(output, &body)
        .with_context(|| format!("Failed to write measurement results to {}", output.display()))?;
    info!(
        "Wrote {} records of measurement {} to {}",
        body.lines().filter(|l| !l.trim().is_empty()).count(),
        measurement,
        output.display()
    );
    Ok(())
}

fn reduction_settings(config: &Config) -> ReductionSettings {
    ReductionSettings {
        percentile: config.reduction.percentile,
        progress_interval: config.general.progress_interval,
    }
}

/// Open the record stream for the selected input
fn open_records(config: &Config, input: &InputArgs) -> Result<RecordReader<Box<dyn BufRead>>> {
    let reader: Box<dyn BufRead> = match (&input.input, input.measurement) {
        (Some(path), _) => {
            info!("Reading measurement records from {}", path.display());
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open measurement file {}", path.display()))?;
            Box::new(BufReader::with_capacity(64 * 1024, file))
        }
        (None, Some(id)) => {
            let client = AtlasMeasurementClient::new(&config.services.measurements)?;
            Box::new(Cursor::new(client.fetch_latest(id)?.into_bytes()))
        }
        (None, None) => color_eyre::eyre::bail!("No measurement input given"),
    };
    Ok(RecordReader::new(reader))
}
