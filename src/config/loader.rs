//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading rate
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CascadeError, CascadeResult};
use crate::models::{Rate, RateLevel};

use super::types::{ClientsFile, RateConfig, RateRecord, RatesFile};

/// Loads a [`RateConfig`] snapshot from YAML.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/sample/
/// ├── default.yaml     # Organization-wide default rate (required)
/// ├── clients.yaml     # Project to client mapping (optional)
/// └── rates/           # Rate records (optional)
///     ├── clients.yaml
///     └── packages.yaml
/// ```
///
/// Records from every file under `rates/` are merged with last-write-wins
/// on `updated_at`, so the same (level, key) may appear in several files.
///
/// # Example
///
/// ```no_run
/// use rate_cascade::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sample")?;
/// println!("Default currency: {}", loader.config().default_currency());
/// # Ok::<(), rate_cascade::error::CascadeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: RateConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `default.yaml` is missing
    /// - Any file contains invalid YAML
    /// - Any rate record fails validation
    pub fn load<P: AsRef<Path>>(path: P) -> CascadeResult<Self> {
        let path = path.as_ref();

        let default_path = path.join("default.yaml");
        let default = Self::load_yaml::<Rate>(&default_path)?;
        Self::validate_default(&default)?;

        let clients_path = path.join("clients.yaml");
        let clients = if clients_path.exists() {
            Self::load_yaml::<ClientsFile>(&clients_path)?
        } else {
            ClientsFile::default()
        };

        let rates_dir = path.join("rates");
        let records = Self::load_rates(&rates_dir)?;

        let config = Self::build(default, clients, records)?;
        info!(
            path = %path.display(),
            packages = config.len_at(RateLevel::Package),
            issues = config.len_at(RateLevel::Issue),
            epics = config.len_at(RateLevel::Epic),
            projects = config.len_at(RateLevel::Project),
            clients = config.len_at(RateLevel::Client),
            "Loaded rate configuration"
        );

        Ok(Self { config })
    }

    /// Builds configuration from YAML documents held in memory.
    ///
    /// `clients` and `rates` may be `None` when there is no mapping or no
    /// rate record to load.
    ///
    /// # Example
    ///
    /// ```
    /// use rate_cascade::config::ConfigLoader;
    /// use rate_cascade::models::RateLevel;
    ///
    /// let loader = ConfigLoader::from_yaml_str(
    ///     "rate: 100\ncurrency: USD\n",
    ///     Some("projects:\n  TECH: TechCo\n"),
    ///     Some("rates:\n  - level: client\n    key: TechCo\n    rate: 130\n    currency: USD\n"),
    /// )?;
    ///
    /// let config = loader.config();
    /// assert_eq!(config.client_for_project("TECH"), Some("TechCo"));
    /// assert!(config.rate_for(RateLevel::Client, "TechCo").is_some());
    /// # Ok::<(), rate_cascade::error::CascadeError>(())
    /// ```
    pub fn from_yaml_str(
        default: &str,
        clients: Option<&str>,
        rates: Option<&str>,
    ) -> CascadeResult<Self> {
        let default = Self::parse_yaml::<Rate>(default, "<default>")?;
        Self::validate_default(&default)?;

        let clients = match clients {
            Some(content) => Self::parse_yaml::<ClientsFile>(content, "<clients>")?,
            None => ClientsFile::default(),
        };

        let records = match rates {
            Some(content) => Self::parse_yaml::<RatesFile>(content, "<rates>")?.rates,
            None => Vec::new(),
        };

        let config = Self::build(default, clients, records)?;
        Ok(Self { config })
    }

    /// Returns the loaded configuration snapshot.
    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    /// Consumes the loader and returns the configuration snapshot.
    pub fn into_config(self) -> RateConfig {
        self.config
    }

    fn build(
        default: Rate,
        clients: ClientsFile,
        records: Vec<RateRecord>,
    ) -> CascadeResult<RateConfig> {
        for record in &records {
            if record.level == RateLevel::Default {
                return Err(CascadeError::InvalidRate {
                    level: record.level,
                    key: record.key.clone(),
                    message: "the default rate belongs in default.yaml".to_string(),
                });
            }
            record.validate()?;
        }

        let mut config = RateConfig::from_records(Some(default), records);
        config.set_project_clients(clients.projects);
        Ok(config)
    }

    fn validate_default(default: &Rate) -> CascadeResult<()> {
        RateRecord {
            level: RateLevel::Default,
            key: String::new(),
            rate: default.rate,
            currency: default.currency.clone(),
            updated_at: None,
        }
        .validate()
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> CascadeResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| CascadeError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&content, &path_str)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(content: &str, origin: &str) -> CascadeResult<T> {
        serde_yaml::from_str(content).map_err(|e| CascadeError::ConfigParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Loads all rate records from the rates directory.
    ///
    /// Files are read in name order so tie-breaks between undated records
    /// do not depend on directory iteration order.
    fn load_rates(rates_dir: &Path) -> CascadeResult<Vec<RateRecord>> {
        if !rates_dir.exists() {
            debug!(path = %rates_dir.display(), "No rates directory, using default rate only");
            return Ok(Vec::new());
        }

        let rates_dir_str = rates_dir.display().to_string();
        let entries = fs::read_dir(rates_dir).map_err(|_| CascadeError::ConfigNotFound {
            path: rates_dir_str.clone(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| CascadeError::ConfigNotFound {
                path: rates_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::new();
        for path in paths {
            let file = Self::load_yaml::<RatesFile>(&path)?;
            debug!(path = %path.display(), records = file.rates.len(), "Loaded rate file");
            records.extend(file.rates);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn config_path() -> &'static str {
        "./config/sample"
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let config = result.unwrap().into_config();
        let default = config.default_rate().unwrap();
        assert_eq!(default.rate, dec("100"));
        assert_eq!(default.currency, "USD");
    }

    #[test]
    fn test_client_mapping_loaded() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(loader.config().client_for_project("TECH"), Some("TechCo"));
        assert_eq!(loader.config().client_for_project("PROJ"), Some("BigCorp"));
        assert_eq!(loader.config().client_for_project("INTERNAL"), None);
    }

    #[test]
    fn test_rates_merged_across_files_last_write_wins() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        // clients.yaml sets TechCo to 120, overrides.yaml raises it to 130 later
        let rate = loader
            .config()
            .rate_for(RateLevel::Client, "TechCo")
            .unwrap();
        assert_eq!(rate.rate, dec("130"));
    }

    #[test]
    fn test_package_rate_loaded_with_currency() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let rate = loader
            .config()
            .rate_for(RateLevel::Package, "Q1-Deliverables")
            .unwrap();
        assert_eq!(rate.rate, dec("175"));
        assert_eq!(rate.currency, "EUR");
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(CascadeError::ConfigNotFound { path }) => {
                assert!(path.contains("default.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_yaml_str_without_optional_documents() {
        let loader = ConfigLoader::from_yaml_str("rate: 0\ncurrency: USD\n", None, None).unwrap();

        assert_eq!(loader.config().default_rate().unwrap().rate, Decimal::ZERO);
        for level in &RateLevel::ALL[..5] {
            assert_eq!(loader.config().len_at(*level), 0);
        }
    }

    #[test]
    fn test_invalid_yaml_returns_parse_error() {
        let result = ConfigLoader::from_yaml_str("rate: [not a number\n", None, None);

        match result {
            Err(CascadeError::ConfigParseError { path, .. }) => assert_eq!(path, "<default>"),
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_rate_record_rejected() {
        let rates = "rates:\n  - level: issue\n    key: TECH-1\n    rate: -5\n    currency: USD\n";
        let result = ConfigLoader::from_yaml_str("rate: 100\ncurrency: USD\n", None, Some(rates));

        match result {
            Err(CascadeError::InvalidRate { level, key, .. }) => {
                assert_eq!(level, RateLevel::Issue);
                assert_eq!(key, "TECH-1");
            }
            other => panic!("Expected InvalidRate, got {:?}", other),
        }
    }

    #[test]
    fn test_default_level_record_rejected() {
        let rates = "rates:\n  - level: default\n    key: org\n    rate: 90\n    currency: USD\n";
        let result = ConfigLoader::from_yaml_str("rate: 100\ncurrency: USD\n", None, Some(rates));

        assert!(matches!(
            result,
            Err(CascadeError::InvalidRate {
                level: RateLevel::Default,
                ..
            })
        ));
    }

    #[test]
    fn test_default_without_currency_rejected() {
        let result = ConfigLoader::from_yaml_str("rate: 100\ncurrency: \"\"\n", None, None);
        assert!(matches!(result, Err(CascadeError::InvalidRate { .. })));
    }
}
