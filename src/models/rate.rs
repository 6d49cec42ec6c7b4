//! Rate models for the cascade.
//!
//! This module defines the [`Rate`] value attached to every configured
//! record, the [`RateLevel`] enumeration of cascade levels and the
//! [`RateDecision`] produced by a resolution.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency used when no default rate and no default currency are configured.
pub const FALLBACK_CURRENCY: &str = "USD";

/// An hourly rate together with its currency.
///
/// # Example
///
/// ```
/// use rate_cascade::models::Rate;
/// use rust_decimal::Decimal;
///
/// let rate = Rate::new(Decimal::new(130, 0), "USD");
/// assert_eq!(rate.currency, "USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The hourly rate.
    pub rate: Decimal,
    /// The ISO currency code of the rate (e.g., "USD", "EUR").
    pub currency: String,
}

impl Rate {
    /// Creates a new rate.
    pub fn new(rate: Decimal, currency: impl Into<String>) -> Self {
        Self {
            rate,
            currency: currency.into(),
        }
    }
}

/// A level of the rate cascade.
///
/// Levels are ordered by priority: `Package` is checked first and
/// `Default` last. The derived `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLevel {
    /// A package of issues with a negotiated rate.
    Package,
    /// A single issue.
    Issue,
    /// The epic the issue belongs to.
    Epic,
    /// The project the issue belongs to.
    Project,
    /// The client the project is mapped to.
    Client,
    /// The organization-wide fallback.
    Default,
}

impl RateLevel {
    /// All levels in priority order.
    pub const ALL: [RateLevel; 6] = [
        RateLevel::Package,
        RateLevel::Issue,
        RateLevel::Epic,
        RateLevel::Project,
        RateLevel::Client,
        RateLevel::Default,
    ];

    /// Returns the snake_case name of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLevel::Package => "package",
            RateLevel::Issue => "issue",
            RateLevel::Epic => "epic",
            RateLevel::Project => "project",
            RateLevel::Client => "client",
            RateLevel::Default => "default",
        }
    }
}

impl fmt::Display for RateLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of resolving a worklog's rate.
///
/// # Example
///
/// ```
/// use rate_cascade::models::{RateDecision, RateLevel};
/// use rust_decimal::Decimal;
///
/// let decision = RateDecision {
///     rate: Decimal::new(130, 0),
///     currency: "USD".to_string(),
///     matched_level: RateLevel::Client,
///     matched_key: Some("TechCo".to_string()),
/// };
/// assert_eq!(decision.matched_level.as_str(), "client");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDecision {
    /// The effective hourly rate.
    pub rate: Decimal,
    /// The currency of the winning record.
    pub currency: String,
    /// The level whose record won.
    pub matched_level: RateLevel,
    /// The identifier of the winning record. `None` for the default level.
    pub matched_key: Option<String>,
}
