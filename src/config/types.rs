//! Configuration types for rate resolution.
//!
//! This module contains the [`RateConfig`] snapshot handed to the resolver
//! and the [`RateRecord`] rows it is built from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CascadeError, CascadeResult};
use crate::models::{FALLBACK_CURRENCY, Rate, RateLevel};

/// A configured rate for one (level, key) pair, as stored by the
/// configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    /// The cascade level the record applies to.
    pub level: RateLevel,
    /// The identifier at that level (package id, issue key, epic key,
    /// project key or client id).
    pub key: String,
    /// The hourly rate.
    pub rate: Decimal,
    /// The currency of the rate.
    pub currency: String,
    /// When the record was last edited. Used for last-write-wins.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RateRecord {
    /// Checks that the record is usable: non-empty key and currency and a
    /// non-negative rate.
    pub fn validate(&self) -> CascadeResult<()> {
        let invalid = |message: &str| CascadeError::InvalidRate {
            level: self.level,
            key: self.key.clone(),
            message: message.to_string(),
        };

        if self.level != RateLevel::Default && self.key.trim().is_empty() {
            return Err(invalid("key must not be empty"));
        }
        if self.currency.trim().is_empty() {
            return Err(invalid("currency must not be empty"));
        }
        if self.rate < Decimal::ZERO {
            return Err(invalid("rate must not be negative"));
        }
        Ok(())
    }
}

/// Project to client mapping file structure (`clients.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientsFile {
    /// Map of project key to client id.
    #[serde(default)]
    pub projects: HashMap<String, String>,
}

/// A file of rate records (`rates/*.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RatesFile {
    /// The records in the file.
    #[serde(default)]
    pub rates: Vec<RateRecord>,
}

/// An immutable snapshot of every configured rate.
///
/// Each level is a single map keyed by its identifier so every cascade
/// step is one lookup. Any map may be empty.
///
/// # Example
///
/// ```
/// use rate_cascade::config::RateConfig;
/// use rate_cascade::models::{Rate, RateLevel};
/// use rust_decimal::Decimal;
///
/// let config = RateConfig::new(Rate::new(Decimal::new(100, 0), "USD"))
///     .with_rate(RateLevel::Client, "TechCo", Rate::new(Decimal::new(130, 0), "USD"));
///
/// assert!(config.rate_for(RateLevel::Client, "TechCo").is_some());
/// assert!(config.rate_for(RateLevel::Issue, "TECH-1").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    #[serde(default)]
    packages: HashMap<String, Rate>,
    #[serde(default)]
    issues: HashMap<String, Rate>,
    #[serde(default)]
    epics: HashMap<String, Rate>,
    #[serde(default)]
    projects: HashMap<String, Rate>,
    #[serde(default)]
    clients: HashMap<String, Rate>,
    #[serde(default)]
    default: Option<Rate>,
    #[serde(default)]
    default_currency: Option<String>,
    #[serde(default)]
    project_clients: HashMap<String, String>,
}

impl RateConfig {
    /// Creates a configuration with only a default rate.
    pub fn new(default: Rate) -> Self {
        Self {
            default: Some(default),
            ..Self::default()
        }
    }

    /// Builds a configuration from raw records, keeping the most recently
    /// updated record for each (level, key) pair.
    ///
    /// Records without `updated_at` are older than any dated record. On a
    /// tie the record that comes later in the input wins.
    pub fn from_records<I>(default: Option<Rate>, records: I) -> Self
    where
        I: IntoIterator<Item = RateRecord>,
    {
        let mut latest: HashMap<(RateLevel, String), RateRecord> = HashMap::new();

        for record in records {
            let slot = (record.level, record.key.clone());
            match latest.get(&slot) {
                Some(existing) if existing.updated_at > record.updated_at => {}
                _ => {
                    latest.insert(slot, record);
                }
            }
        }

        let mut config = Self {
            default,
            ..Self::default()
        };
        for ((level, key), record) in latest {
            config.set_rate(level, key, Rate::new(record.rate, record.currency));
        }
        config
    }

    /// Sets the rate for a (level, key) pair, replacing any previous one.
    ///
    /// For [`RateLevel::Default`] the key is ignored and the default rate
    /// is replaced.
    pub fn set_rate(&mut self, level: RateLevel, key: impl Into<String>, rate: Rate) {
        match level {
            RateLevel::Default => self.default = Some(rate),
            _ => {
                if let Some(map) = self.level_map_mut(level) {
                    map.insert(key.into(), rate);
                }
            }
        }
    }

    /// Builder form of [`RateConfig::set_rate`].
    pub fn with_rate(mut self, level: RateLevel, key: impl Into<String>, rate: Rate) -> Self {
        self.set_rate(level, key, rate);
        self
    }

    /// Maps a project to a client.
    pub fn with_project_client(
        mut self,
        project_key: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.project_clients
            .insert(project_key.into(), client_id.into());
        self
    }

    /// Sets the currency used when no default rate is configured.
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = Some(currency.into());
        self
    }

    /// Removes every rate configured at a level.
    pub fn clear_level(&mut self, level: RateLevel) {
        match level {
            RateLevel::Default => self.default = None,
            _ => {
                if let Some(map) = self.level_map_mut(level) {
                    map.clear();
                }
            }
        }
    }

    /// Looks up the rate configured for a key at a level.
    pub fn rate_for(&self, level: RateLevel, key: &str) -> Option<&Rate> {
        match level {
            RateLevel::Package => self.packages.get(key),
            RateLevel::Issue => self.issues.get(key),
            RateLevel::Epic => self.epics.get(key),
            RateLevel::Project => self.projects.get(key),
            RateLevel::Client => self.clients.get(key),
            RateLevel::Default => self.default.as_ref(),
        }
    }

    /// Returns the organization-wide default rate, if configured.
    pub fn default_rate(&self) -> Option<&Rate> {
        self.default.as_ref()
    }

    /// Returns the currency used for the zero fallback when no default rate
    /// is configured.
    pub fn default_currency(&self) -> &str {
        self.default_currency
            .as_deref()
            .unwrap_or(FALLBACK_CURRENCY)
    }

    /// Returns the client a project is mapped to.
    pub fn client_for_project(&self, project_key: &str) -> Option<&str> {
        self.project_clients.get(project_key).map(String::as_str)
    }

    /// Returns the number of rates configured at a level.
    pub fn len_at(&self, level: RateLevel) -> usize {
        match level {
            RateLevel::Default => usize::from(self.default.is_some()),
            _ => self.level_map(level).map_or(0, HashMap::len),
        }
    }

    fn level_map(&self, level: RateLevel) -> Option<&HashMap<String, Rate>> {
        match level {
            RateLevel::Package => Some(&self.packages),
            RateLevel::Issue => Some(&self.issues),
            RateLevel::Epic => Some(&self.epics),
            RateLevel::Project => Some(&self.projects),
            RateLevel::Client => Some(&self.clients),
            RateLevel::Default => None,
        }
    }

    fn level_map_mut(&mut self, level: RateLevel) -> Option<&mut HashMap<String, Rate>> {
        match level {
            RateLevel::Package => Some(&mut self.packages),
            RateLevel::Issue => Some(&mut self.issues),
            RateLevel::Epic => Some(&mut self.epics),
            RateLevel::Project => Some(&mut self.projects),
            RateLevel::Client => Some(&mut self.clients),
            RateLevel::Default => None,
        }
    }

    pub(crate) fn set_project_clients(&mut self, project_clients: HashMap<String, String>) {
        self.project_clients = project_clients;
    }
}
