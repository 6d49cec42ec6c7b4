//! Audit models.
//!
//! Every rate decision can be accompanied by an [`AuditStep`] that records
//! what was looked up and why a level won, so a billing preview can show
//! "matched at: client" next to each worklog.

use serde::{Deserialize, Serialize};

/// A single step in an audit trace recording a resolution decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated while building billing output.
///
/// Warnings do not stop a billing run but flag worklogs that need review.
///
/// # Example
///
/// ```
/// use rate_cascade::models::AuditWarning;
///
/// let warning = AuditWarning {
///     code: "ZERO_DEFAULT_RATE".to_string(),
///     message: "Worklog wl_001 fell back to a zero default rate".to_string(),
///     severity: "medium".to_string(),
///     worklog_id: Some("wl_001".to_string()),
/// };
/// assert_eq!(warning.severity, "medium");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
    /// The worklog the warning refers to, if any.
    pub worklog_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 1,
            rule_id: "rate_cascade".to_string(),
            rule_name: "Rate Cascade".to_string(),
            input: serde_json::json!({ "issue_key": "TECH-123" }),
            output: serde_json::json!({ "matched_level": "client" }),
            reasoning: "matched at: client".to_string(),
        };

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["rule_id"], "rate_cascade");
        assert_eq!(json["input"]["issue_key"], "TECH-123");
        assert_eq!(json["output"]["matched_level"], "client");
    }

    #[test]
    fn test_warning_without_worklog_serializes_null() {
        let warning = AuditWarning {
            code: "EMPTY_PERIOD".to_string(),
            message: "No worklogs in period".to_string(),
            severity: "low".to_string(),
            worklog_id: None,
        };

        let json = serde_json::to_value(&warning).unwrap();
        assert!(json["worklog_id"].is_null());
    }
}
