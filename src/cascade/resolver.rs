//! Rate cascade resolution.
//!
//! This module determines the hourly rate of a single worklog by checking
//! the configured levels in priority order and stopping at the first match:
//!
//! 1. Package (each package id in the order listed on the worklog)
//! 2. Issue
//! 3. Epic (when the worklog has one)
//! 4. Project
//! 5. Client (when the worklog has one)
//! 6. Default

use std::iter;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::RateConfig;
use crate::error::CascadeResult;
use crate::models::{AuditStep, Rate, RateDecision, RateLevel, Worklog};

/// The result of a resolution, including the decision and audit step.
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// The rate decision.
    pub decision: RateDecision,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Determines the hourly rate that applies to a worklog.
///
/// Levels the worklog cannot be evaluated at (no epic, no client, no
/// packages) are skipped. When nothing matches the default rate is used;
/// if the configuration has no default the result is a zero rate in the
/// configured default currency, still reported at the default level.
///
/// # Errors
///
/// Returns `InvalidInput` if the worklog's `issue_key` or `project_key` is
/// empty, whatever the configuration holds.
///
/// # Examples
///
/// ```
/// use rate_cascade::cascade::resolve;
/// use rate_cascade::config::RateConfig;
/// use rate_cascade::models::{Rate, RateLevel, Worklog};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = RateConfig::new(Rate::new(Decimal::new(100, 0), "USD"))
///     .with_rate(RateLevel::Client, "TechCo", Rate::new(Decimal::new(130, 0), "USD"));
///
/// let mut worklog = Worklog::new(
///     "wl_001",
///     "TECH-123",
///     "TECH",
///     Decimal::new(2, 0),
///     NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
/// );
/// worklog.client_id = Some("TechCo".to_string());
///
/// let decision = resolve(&worklog, &config)?;
/// assert_eq!(decision.rate, Decimal::new(130, 0));
/// assert_eq!(decision.matched_level, RateLevel::Client);
/// # Ok::<(), rate_cascade::error::CascadeError>(())
/// ```
pub fn resolve(worklog: &Worklog, config: &RateConfig) -> CascadeResult<RateDecision> {
    worklog.validate()?;

    let matched = candidates(worklog)
        .find_map(|(level, key)| config.rate_for(level, key).map(|rate| (level, key, rate)));

    Ok(decide(worklog, matched, config))
}

/// Resolves a worklog's rate and records an audit step describing every
/// level that was checked.
///
/// # Errors
///
/// Returns `InvalidInput` under the same conditions as [`resolve`].
pub fn resolve_with_audit(
    worklog: &Worklog,
    config: &RateConfig,
    step_number: u32,
) -> CascadeResult<ResolutionResult> {
    worklog.validate()?;

    let mut checked = Vec::new();
    let mut matched = None;
    for (level, key) in candidates(worklog) {
        let rate = config.rate_for(level, key);
        checked.push(serde_json::json!({
            "level": level,
            "key": key,
            "configured": rate.is_some(),
        }));
        if let Some(rate) = rate {
            matched = Some((level, key, rate));
            break;
        }
    }

    let decision = decide(worklog, matched, config);

    let tried: Vec<String> = candidates(worklog)
        .map(|(level, key)| format!("{} '{}'", level, key))
        .collect();

    let reasoning = match &decision.matched_key {
        Some(key) => format!(
            "matched at: {} '{}' after checking {} candidate(s): {} {} per hour",
            decision.matched_level,
            key,
            checked.len(),
            decision.rate,
            decision.currency
        ),
        None => format!(
            "matched at: default after {} candidate(s) found no rate ({}): {} {} per hour",
            tried.len(),
            tried.join(", "),
            decision.rate,
            decision.currency
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "rate_cascade".to_string(),
        rule_name: "Rate Cascade Resolution".to_string(),
        input: serde_json::json!({
            "worklog_id": worklog.id,
            "issue_key": worklog.issue_key,
            "epic_key": worklog.epic(),
            "project_key": worklog.project_key,
            "client_id": worklog.client(),
            "package_ids": worklog.package_ids,
        }),
        output: serde_json::json!({
            "rate": decision.rate.to_string(),
            "currency": decision.currency,
            "matched_level": decision.matched_level,
            "matched_key": decision.matched_key,
            "checked": checked,
        }),
        reasoning,
    };

    Ok(ResolutionResult {
        decision,
        audit_step,
    })
}

/// Yields the (level, key) pairs to look up, in priority order.
fn candidates(worklog: &Worklog) -> impl Iterator<Item = (RateLevel, &str)> {
    let packages = worklog
        .package_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !id.trim().is_empty())
        .map(|id| (RateLevel::Package, id));

    packages
        .chain(iter::once((RateLevel::Issue, worklog.issue_key.as_str())))
        .chain(worklog.epic().map(|key| (RateLevel::Epic, key)))
        .chain(iter::once((RateLevel::Project, worklog.project_key.as_str())))
        .chain(worklog.client().map(|key| (RateLevel::Client, key)))
}

fn decide(
    worklog: &Worklog,
    matched: Option<(RateLevel, &str, &Rate)>,
    config: &RateConfig,
) -> RateDecision {
    if let Some((level, key, rate)) = matched {
        debug!(
            worklog_id = %worklog.id,
            level = %level,
            key = %key,
            rate = %rate.rate,
            "Rate matched"
        );
        return RateDecision {
            rate: rate.rate,
            currency: rate.currency.clone(),
            matched_level: level,
            matched_key: Some(key.to_string()),
        };
    }

    match config.default_rate() {
        Some(default) => RateDecision {
            rate: default.rate,
            currency: default.currency.clone(),
            matched_level: RateLevel::Default,
            matched_key: None,
        },
        None => {
            warn!(
                worklog_id = %worklog.id,
                currency = %config.default_currency(),
                "No default rate configured, falling back to zero"
            );
            RateDecision {
                rate: Decimal::ZERO,
                currency: config.default_currency().to_string(),
                matched_level: RateLevel::Default,
                matched_key: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CascadeError;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn usd(s: &str) -> Rate {
        Rate::new(dec(s), "USD")
    }

    fn create_worklog(issue_key: &str, project_key: &str) -> Worklog {
        Worklog::new(
            "wl_001",
            issue_key,
            project_key,
            dec("2.5"),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        )
    }

    /// A worklog that can be evaluated at all six levels.
    fn create_full_worklog() -> Worklog {
        let mut worklog = create_worklog("PROJ-101", "PROJ");
        worklog.epic_key = Some("AUTH-10".to_string());
        worklog.client_id = Some("BigCorp".to_string());
        worklog.package_ids = vec!["Q1-Deliverables".to_string()];
        worklog
    }

    fn create_full_config() -> RateConfig {
        RateConfig::new(usd("100"))
            .with_rate(RateLevel::Package, "Q1-Deliverables", Rate::new(dec("175"), "EUR"))
            .with_rate(RateLevel::Issue, "PROJ-101", usd("160"))
            .with_rate(RateLevel::Epic, "AUTH-10", usd("150"))
            .with_rate(RateLevel::Project, "PROJ", usd("145"))
            .with_rate(RateLevel::Client, "BigCorp", usd("140"))
    }

    /// RC-001: levels step down in order as they are removed from the top
    #[test]
    fn test_priority_order_steps_down_level_by_level() {
        let worklog = create_full_worklog();
        let mut config = create_full_config();

        for level in RateLevel::ALL {
            let decision = resolve(&worklog, &config).unwrap();
            assert_eq!(decision.matched_level, level);
            config.clear_level(level);
        }
    }

    /// RC-002: client rate used when nothing more specific is set
    #[test]
    fn test_client_rate_beats_default() {
        let config = RateConfig::new(usd("100")).with_rate(RateLevel::Client, "TechCo", usd("130"));
        let mut worklog = create_worklog("TECH-123", "TECH");
        worklog.client_id = Some("TechCo".to_string());

        let decision = resolve(&worklog, &config).unwrap();

        assert_eq!(decision.rate, dec("130"));
        assert_eq!(decision.currency, "USD");
        assert_eq!(decision.matched_level, RateLevel::Client);
        assert_eq!(decision.matched_key.as_deref(), Some("TechCo"));
    }

    /// RC-003: first listed package with a rate wins
    #[test]
    fn test_first_listed_package_with_rate_wins() {
        let config = RateConfig::new(usd("100"))
            .with_rate(RateLevel::Package, "Retainer", usd("90"))
            .with_rate(RateLevel::Package, "Q1-Deliverables", Rate::new(dec("175"), "EUR"));
        let mut worklog = create_worklog("PROJ-101", "PROJ");
        worklog.package_ids = vec![
            "Unpriced".to_string(),
            "Q1-Deliverables".to_string(),
            "Retainer".to_string(),
        ];

        let decision = resolve(&worklog, &config).unwrap();

        assert_eq!(decision.matched_level, RateLevel::Package);
        assert_eq!(decision.matched_key.as_deref(), Some("Q1-Deliverables"));
        assert_eq!(decision.currency, "EUR");
    }

    /// RC-004: unpriced packages fall through to the issue level
    #[test]
    fn test_unpriced_packages_fall_through() {
        let config = RateConfig::new(usd("100")).with_rate(RateLevel::Issue, "PROJ-101", usd("160"));
        let mut worklog = create_worklog("PROJ-101", "PROJ");
        worklog.package_ids = vec!["Unpriced".to_string()];

        let decision = resolve(&worklog, &config).unwrap();
        assert_eq!(decision.matched_level, RateLevel::Issue);
    }

    /// RC-005: empty package list behaves like no packages
    #[test]
    fn test_empty_package_ids_same_as_none() {
        let config = create_full_config();
        let mut with_empty = create_full_worklog();
        with_empty.package_ids = vec![];
        let mut with_blank = create_full_worklog();
        with_blank.package_ids = vec![String::new()];

        let a = resolve(&with_empty, &config).unwrap();
        let b = resolve(&with_blank, &config).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.matched_level, RateLevel::Issue);
    }

    /// RC-006: epic and client levels are skipped when absent
    #[test]
    fn test_missing_optional_levels_are_skipped() {
        let config = RateConfig::new(usd("100"))
            .with_rate(RateLevel::Epic, "AUTH-10", usd("150"))
            .with_rate(RateLevel::Client, "BigCorp", usd("140"));
        let worklog = create_worklog("PROJ-101", "PROJ");

        let decision = resolve(&worklog, &config).unwrap();
        assert_eq!(decision.matched_level, RateLevel::Default);
        assert_eq!(decision.matched_key, None);
    }

    /// RC-007: missing default falls back to zero in the default currency
    #[test]
    fn test_missing_default_falls_back_to_zero() {
        let worklog = create_worklog("INTERNAL-456", "INTERNAL");

        let decision = resolve(&worklog, &RateConfig::default()).unwrap();
        assert_eq!(decision.rate, Decimal::ZERO);
        assert_eq!(decision.currency, "USD");
        assert_eq!(decision.matched_level, RateLevel::Default);

        let config = RateConfig::default().with_default_currency("EUR");
        let decision = resolve(&worklog, &config).unwrap();
        assert_eq!(decision.currency, "EUR");
    }

    /// RC-008: empty keys are rejected before any lookup
    #[test]
    fn test_empty_issue_key_rejected() {
        let worklog = create_worklog("", "TECH");

        match resolve(&worklog, &create_full_config()) {
            Err(CascadeError::InvalidInput { field, .. }) => assert_eq!(field, "issue_key"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_project_key_rejected() {
        let worklog = create_worklog("TECH-1", "");
        assert!(matches!(
            resolve(&worklog, &RateConfig::default()),
            Err(CascadeError::InvalidInput { .. })
        ));
        assert!(resolve_with_audit(&worklog, &RateConfig::default(), 1).is_err());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let worklog = create_full_worklog();
        let config = create_full_config();

        assert_eq!(
            resolve(&worklog, &config).unwrap(),
            resolve(&worklog, &config).unwrap()
        );
    }

    #[test]
    fn test_audit_matches_plain_resolution() {
        let worklog = create_full_worklog();
        let mut config = create_full_config();
        config.clear_level(RateLevel::Package);
        config.clear_level(RateLevel::Issue);

        let plain = resolve(&worklog, &config).unwrap();
        let audited = resolve_with_audit(&worklog, &config, 3).unwrap();

        assert_eq!(audited.decision, plain);
        assert_eq!(audited.audit_step.step_number, 3);
        assert_eq!(audited.audit_step.rule_id, "rate_cascade");
        assert_eq!(audited.audit_step.output["matched_level"], "epic");
        assert_eq!(audited.audit_step.output["rate"], "150");
    }

    #[test]
    fn test_audit_records_checked_candidates() {
        let mut worklog = create_full_worklog();
        worklog.package_ids = vec!["A".to_string(), "B".to_string()];
        let config = RateConfig::new(usd("100")).with_rate(RateLevel::Project, "PROJ", usd("145"));

        let result = resolve_with_audit(&worklog, &config, 1).unwrap();
        let checked = result.audit_step.output["checked"].as_array().unwrap();

        // A, B, issue, epic, project
        assert_eq!(checked.len(), 5);
        assert_eq!(checked[0]["level"], "package");
        assert_eq!(checked[0]["configured"], false);
        assert_eq!(checked[4]["level"], "project");
        assert_eq!(checked[4]["configured"], true);
        assert!(result.audit_step.reasoning.starts_with("matched at: project 'PROJ'"));
    }

    #[test]
    fn test_audit_reasoning_for_default() {
        let worklog = create_worklog("INTERNAL-456", "INTERNAL");
        let config = RateConfig::new(usd("0"));

        let result = resolve_with_audit(&worklog, &config, 1).unwrap();

        assert_eq!(result.decision.matched_level, RateLevel::Default);
        assert!(result.audit_step.reasoning.starts_with("matched at: default"));
        assert_eq!(
            result.audit_step.reasoning,
            "matched at: default after 2 candidate(s) found no rate \
             (issue 'INTERNAL-456', project 'INTERNAL'): 0 USD per hour"
        );
        assert!(!result.audit_step.reasoning.contains("epic"));
        assert!(!result.audit_step.reasoning.contains("client"));
        assert!(result.audit_step.input["epic_key"].is_null());
    }
}
