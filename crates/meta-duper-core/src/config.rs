use crate::error::Error;
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "meta_duper.toml";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Regexes a listed name must match (any of them) to become a candidate.
    pub required_patterns: Vec<String>,
    /// Regexes that drop a name from the candidate list.
    pub excluded_patterns: Vec<String>,
    pub sidecar_suffix: String,
    pub segment_separator: String,
    /// The last recording is kept unless an earlier copy is larger than
    /// `last_size * size_factor`.
    pub size_factor: f64,
    pub match_empty_description: bool,
    pub delete_on_resolve: bool,
    pub log_write_enabled: bool,
    pub audit_log_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            required_patterns: vec!["[.]ts[.]meta$".to_string()],
            excluded_patterns: vec![
                "[Uu]utiset".to_string(),
                "Ylen aamu".to_string(),
                " Pilanp..?iten".to_string(),
            ],
            sidecar_suffix: ".ts.meta".to_string(),
            segment_separator: " - ".to_string(),
            size_factor: 0.95,
            match_empty_description: true,
            delete_on_resolve: false,
            log_write_enabled: true,
            audit_log_path: "duplicate_search_log.csv".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.size_factor.is_finite() || self.size_factor <= 0.0 || self.size_factor > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "size_factor must be in (0, 1], got {}",
                self.size_factor
            )));
        }
        if self.sidecar_suffix.is_empty() {
            return Err(Error::InvalidConfig("sidecar_suffix is empty".to_string()));
        }
        if self.segment_separator.is_empty() {
            return Err(Error::InvalidConfig("segment_separator is empty".to_string()));
        }
        Ok(())
    }
}

/// Write the default configuration to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn write_default_if_missing(path: &Path) -> Result<bool, Error> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(&AppConfig::default())?;
    fs::write(path, contents)?;
    info!("Wrote default configuration to {}", path.display());
    Ok(true)
}

/// Load the configuration file at `path`, creating it with defaults first if
/// it does not exist. `META_DUPER_*` environment variables override the file.
pub fn load_configuration(path: &Path) -> Result<AppConfig, Error> {
    write_default_if_missing(path)?;

    let builder = Config::builder()
        .add_source(ConfigFile::from(path).required(false))
        .add_source(
            Environment::with_prefix("META_DUPER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("required_patterns")
                .with_list_parse_key("excluded_patterns"),
        )
        .build()?;
    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    debug!("Loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size_factor, 0.95);
        assert!(config.match_empty_description);
        assert!(!config.delete_on_resolve);
    }

    #[test]
    fn test_size_factor_bounds() {
        for bad in [0.0, -0.5, 1.01, f64::NAN] {
            let config = AppConfig {
                size_factor: bad,
                ..AppConfig::default()
            };
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
        let config = AppConfig {
            size_factor: 1.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta_duper.toml");

        let config = load_configuration(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, AppConfig::default());

        assert!(!write_default_if_missing(&path).unwrap());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "size_factor = 0.8\nmatch_empty_description = false\nexcluded_patterns = []\n",
        )
        .unwrap();

        let config = load_configuration(&path).unwrap();
        assert_eq!(config.size_factor, 0.8);
        assert!(!config.match_empty_description);
        assert!(config.excluded_patterns.is_empty());
        assert_eq!(config.sidecar_suffix, ".ts.meta");
    }

    #[test]
    fn test_invalid_file_value_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "size_factor = 1.5\n").unwrap();

        assert!(matches!(
            load_configuration(&path),
            Err(Error::InvalidConfig(_))
        ));
    }
}
