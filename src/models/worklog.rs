//! Worklog model.
//!
//! A worklog is a single logged unit of time against a tracked issue. It
//! carries the identifiers the cascade needs to pick a rate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RateConfig;
use crate::error::{CascadeError, CascadeResult};

fn default_billable() -> bool {
    true
}

/// A logged unit of work needing a rate.
///
/// # Example
///
/// ```
/// use rate_cascade::models::Worklog;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let worklog = Worklog::new(
///     "wl_001",
///     "TECH-123",
///     "TECH",
///     Decimal::new(15, 1),
///     NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
/// );
/// assert!(worklog.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worklog {
    /// Identifier of the worklog, used for reporting.
    pub id: String,
    /// The issue the time was logged against (e.g., "TECH-123").
    pub issue_key: String,
    /// The epic containing the issue, if any.
    #[serde(default)]
    pub epic_key: Option<String>,
    /// The project of the issue (e.g., "TECH").
    pub project_key: String,
    /// The client the project is mapped to, if any.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Packages the issue belongs to, in priority order.
    #[serde(default)]
    pub package_ids: Vec<String>,
    /// Logged time in hours.
    pub duration_hours: Decimal,
    /// The day the work was logged on.
    pub date: NaiveDate,
    /// Whether the worklog was classified as billable.
    #[serde(default = "default_billable")]
    pub billable: bool,
}

impl Worklog {
    /// Creates a billable worklog with no epic, client or packages.
    pub fn new(
        id: impl Into<String>,
        issue_key: impl Into<String>,
        project_key: impl Into<String>,
        duration_hours: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            issue_key: issue_key.into(),
            epic_key: None,
            project_key: project_key.into(),
            client_id: None,
            package_ids: Vec::new(),
            duration_hours,
            date,
            billable: true,
        }
    }

    /// Checks that the worklog can be attributed to an issue and a project.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `issue_key` or `project_key` is empty or
    /// only whitespace.
    pub fn validate(&self) -> CascadeResult<()> {
        if self.issue_key.trim().is_empty() {
            return Err(CascadeError::empty_field("issue_key"));
        }
        if self.project_key.trim().is_empty() {
            return Err(CascadeError::empty_field("project_key"));
        }
        Ok(())
    }

    /// Returns the epic key if it is present and non-empty.
    pub fn epic(&self) -> Option<&str> {
        non_empty(self.epic_key.as_deref())
    }

    /// Returns the client id if it is present and non-empty.
    pub fn client(&self) -> Option<&str> {
        non_empty(self.client_id.as_deref())
    }

    /// Fills a missing client id from the project-to-client mapping.
    ///
    /// A client id already present on the worklog is kept.
    pub fn with_client_from(mut self, config: &RateConfig) -> Self {
        if self.client().is_none() {
            if let Some(client) = config.client_for_project(&self.project_key) {
                self.client_id = Some(client.to_string());
            }
        }
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Derives the project key from an issue key.
///
/// The project key is the text before the first `-`; an issue key without
/// a dash is returned unchanged.
///
/// ```
/// use rate_cascade::models::project_key_from_issue;
///
/// assert_eq!(project_key_from_issue("TECH-123"), "TECH");
/// assert_eq!(project_key_from_issue("ADHOC"), "ADHOC");
/// ```
pub fn project_key_from_issue(issue_key: &str) -> &str {
    issue_key
        .split_once('-')
        .map_or(issue_key, |(project, _)| project)
}
