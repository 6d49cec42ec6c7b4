//! Billing preview models.
//!
//! This module contains the [`BillingPreview`] type and its associated
//! structures capturing the output of a billing run: line items, per
//! currency subtotals, hour totals, skipped worklogs and warnings.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuditWarning;

/// How worklogs are grouped into line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    /// One line item per project.
    #[default]
    Project,
    /// One line item per issue.
    Issue,
    /// One line item per client.
    Client,
    /// One line item per matched cascade level.
    Level,
}

/// Parameters of a billing preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// First day of the billing period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the billing period (inclusive).
    pub period_end: NaiveDate,
    /// Grouping of line items.
    #[serde(default)]
    pub group_by: GroupBy,
}

/// A worklog that could not be rated, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedWorklog {
    /// The id of the rejected worklog.
    pub worklog_id: String,
    /// Why it was rejected.
    pub reason: String,
}

/// A single line of a billing preview.
///
/// # Example
///
/// ```
/// use rate_cascade::models::BillingLineItem;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let line = BillingLineItem {
///     description: "Project TECH".to_string(),
///     group_key: "TECH".to_string(),
///     currency: "USD".to_string(),
///     quantity_hours: Decimal::from_str("7.50").unwrap(),
///     hourly_rate: Decimal::from_str("130.00").unwrap(),
///     amount: Decimal::from_str("975.00").unwrap(),
///     worklog_count: 3,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingLineItem {
    /// Human-readable description of the group.
    pub description: String,
    /// The key the worklogs were grouped by.
    pub group_key: String,
    /// The currency of the amount.
    pub currency: String,
    /// Total hours in the group, rounded to cents.
    pub quantity_hours: Decimal,
    /// Average hourly rate (amount / hours), rounded to cents.
    pub hourly_rate: Decimal,
    /// Sum of the per-worklog amounts.
    pub amount: Decimal,
    /// Number of worklogs in the group.
    pub worklog_count: usize,
}

/// The complete result of a billing preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPreview {
    /// Unique identifier for this preview.
    pub preview_id: Uuid,
    /// When the preview was generated.
    pub generated_at: DateTime<Utc>,
    /// The version of the engine that generated the preview.
    pub engine_version: String,
    /// First day of the billing period.
    pub period_start: NaiveDate,
    /// Last day of the billing period.
    pub period_end: NaiveDate,
    /// Grouping of line items.
    pub group_by: GroupBy,
    /// Line items, largest amount first.
    pub line_items: Vec<BillingLineItem>,
    /// Sum of line item amounts per currency.
    pub subtotals: BTreeMap<String, Decimal>,
    /// Hours with a resolved rate greater than zero.
    pub billable_hours: Decimal,
    /// Hours classified non-billable or resolved at a zero rate.
    pub non_billable_hours: Decimal,
    /// Worklogs that could not be rated.
    pub skipped: Vec<RejectedWorklog>,
    /// Warnings for worklogs needing review.
    pub warnings: Vec<AuditWarning>,
}
