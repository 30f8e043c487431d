use crate::config::Config;
use crate::utils::ip_utils::AddressPolicy;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// Load the configuration file if one was given, otherwise use defaults
pub fn load_or_default(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => load_config(path),
        None => {
            info!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// Command-line values that take precedence over the YAML file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub cache_dir: Option<PathBuf>,
    pub no_cache: bool,
    pub percentile: Option<f64>,
    pub address_policy: Option<AddressPolicy>,
    pub threads: Option<usize>,
}

/// Apply CLI overrides to a configuration and re-validate it
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(level) = &overrides.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(dir) = &overrides.cache_dir {
        config.cache.dir = dir.clone();
    }
    if overrides.no_cache {
        config.cache.enabled = false;
    }
    if let Some(p) = overrides.percentile {
        config.reduction.percentile = p;
    }
    if let Some(policy) = overrides.address_policy {
        config.filter.address_policy = policy;
    }
    if let Some(threads) = overrides.threads {
        config.general.threads = threads;
    }

    config.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let yaml = r#"
general:
  progress_interval: 100
cache:
  dir: /tmp/hopcheck-test
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.general.progress_interval, 100);
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/hopcheck-test"));
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "reduction:\n  percentile: -1\n").unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/hopcheck.yaml")).is_err());
        assert_eq!(load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let overrides = CliOverrides {
            log_level: Some("debug".to_string()),
            cache_dir: Some(PathBuf::from("cache")),
            no_cache: true,
            percentile: Some(1.0),
            address_policy: Some(AddressPolicy::Parsed),
            threads: Some(4),
        };

        apply_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert!(!config.cache.enabled);
        assert_eq!(config.reduction.percentile, 1.0);
        assert_eq!(config.filter.address_policy, AddressPolicy::Parsed);
        assert_eq!(config.general.threads, 4);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = Config::default();
        let overrides = CliOverrides {
            percentile: Some(250.0),
            ..Default::default()
        };
        assert!(apply_overrides(&mut config, &overrides).is_err());
    }
}
