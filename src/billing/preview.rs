//! Billing preview computation.
//!
//! Rates every worklog of a billing period, prices it, and groups the
//! results into line items with per-currency subtotals.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cascade::resolve;
use crate::config::RateConfig;
use crate::error::{CascadeError, CascadeResult};
use crate::models::{
    AuditWarning, BillingLineItem, BillingPreview, GroupBy, PreviewRequest, RateDecision,
    RateLevel, RejectedWorklog, Worklog,
};

/// Warning code for worklogs that fell back to a zero default rate.
pub const ZERO_DEFAULT_RATE_WARNING: &str = "ZERO_DEFAULT_RATE";

/// Group key reported for worklogs without a client when grouping by client.
pub const UNASSIGNED_CLIENT: &str = "unassigned";

#[derive(Debug, Default)]
struct LineAccumulator {
    description: String,
    hours: Decimal,
    amount: Decimal,
    worklog_count: usize,
}

/// Running totals of a preview.
///
/// Groups are keyed by `(group key, currency)`; a `None` group key is the
/// clientless group, kept apart from any real client id.
#[derive(Debug, Default)]
struct PreviewTotals {
    groups: BTreeMap<(Option<String>, String), LineAccumulator>,
    subtotals: BTreeMap<String, Decimal>,
    billable_hours: Decimal,
    non_billable_hours: Decimal,
}

impl PreviewTotals {
    fn add_non_billable(&mut self, hours: Decimal) -> CascadeResult<()> {
        self.non_billable_hours = checked_add(self.non_billable_hours, hours)?;
        Ok(())
    }

    /// Adds a rated worklog. On overflow nothing is updated.
    fn add_rated(
        &mut self,
        worklog: &Worklog,
        decision: &RateDecision,
        group_by: GroupBy,
    ) -> CascadeResult<()> {
        let hours = worklog.duration_hours;
        let amount = hours
            .checked_mul(decision.rate)
            .ok_or_else(|| CascadeError::CalculationError {
                message: format!("{} hours at {} overflows", hours, decision.rate),
            })?
            .round_dp(2);

        let (billable_hours, non_billable_hours) = if decision.rate > Decimal::ZERO {
            (checked_add(self.billable_hours, hours)?, self.non_billable_hours)
        } else {
            (self.billable_hours, checked_add(self.non_billable_hours, hours)?)
        };

        let (group_key, description) = group_for(worklog, decision, group_by);
        let slot = (group_key, decision.currency.clone());
        let (line_hours, line_amount) = match self.groups.get(&slot) {
            Some(line) => (checked_add(line.hours, hours)?, checked_add(line.amount, amount)?),
            None => (hours, amount),
        };
        let subtotal = checked_add(
            self.subtotals
                .get(&decision.currency)
                .copied()
                .unwrap_or_default(),
            amount,
        )?;

        self.billable_hours = billable_hours;
        self.non_billable_hours = non_billable_hours;
        self.subtotals.insert(decision.currency.clone(), subtotal);

        let line = self.groups.entry(slot).or_default();
        line.description = description;
        line.hours = line_hours;
        line.amount = line_amount;
        line.worklog_count += 1;
        Ok(())
    }
}

fn checked_add(total: Decimal, value: Decimal) -> CascadeResult<Decimal> {
    total
        .checked_add(value)
        .ok_or_else(|| CascadeError::CalculationError {
            message: format!("adding {} to {} overflows", value, total),
        })
}

/// Computes a billing preview for the worklogs of a period.
///
/// Worklogs dated outside the period are ignored. Worklogs classified as
/// non-billable are counted as non-billable hours without being rated.
/// A worklog without a client takes the client its project is mapped to.
/// Each remaining worklog is priced at `hours * rate` rounded to cents, and
/// line items sum those rounded amounts. Worklogs that cannot be rated or
/// whose amounts overflow are listed in `skipped`.
///
/// # Errors
///
/// Returns `InvalidInput` if the period ends before it starts.
///
/// # Examples
///
/// ```
/// use rate_cascade::billing::compute_billing_preview;
/// use rate_cascade::config::RateConfig;
/// use rate_cascade::models::{GroupBy, PreviewRequest, Rate, Worklog};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = RateConfig::new(Rate::new(Decimal::new(100, 0), "USD"));
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let worklogs = vec![Worklog::new("wl_001", "TECH-1", "TECH", Decimal::new(15, 1), date)];
/// let request = PreviewRequest {
///     period_start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
///     period_end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
///     group_by: GroupBy::Project,
/// };
///
/// let preview = compute_billing_preview(&worklogs, &config, &request)?;
/// assert_eq!(preview.subtotals["USD"], Decimal::new(150, 0));
/// # Ok::<(), rate_cascade::error::CascadeError>(())
/// ```
pub fn compute_billing_preview(
    worklogs: &[Worklog],
    config: &RateConfig,
    request: &PreviewRequest,
) -> CascadeResult<BillingPreview> {
    if request.period_end < request.period_start {
        return Err(CascadeError::InvalidInput {
            field: "period".to_string(),
            message: format!(
                "period end {} is before period start {}",
                request.period_end, request.period_start
            ),
        });
    }

    let mut totals = PreviewTotals::default();
    let mut skipped = Vec::new();
    let mut warnings = Vec::new();

    let in_period = worklogs
        .iter()
        .filter(|wl| wl.date >= request.period_start && wl.date <= request.period_end);

    for worklog in in_period {
        let outcome = if worklog.billable {
            price_worklog(&mut totals, &mut warnings, worklog, config, request.group_by)
        } else {
            totals.add_non_billable(worklog.duration_hours)
        };

        if let Err(err) = outcome {
            warn!(worklog_id = %worklog.id, error = %err, "Skipping worklog in billing preview");
            skipped.push(RejectedWorklog {
                worklog_id: worklog.id.clone(),
                reason: err.to_string(),
            });
        }
    }

    let mut line_items: Vec<BillingLineItem> = totals
        .groups
        .into_iter()
        .map(|((group_key, currency), line)| {
            let hourly_rate = if line.hours > Decimal::ZERO {
                line.amount
                    .checked_div(line.hours)
                    .map_or(Decimal::ZERO, |rate| rate.round_dp(2))
            } else {
                Decimal::ZERO
            };
            BillingLineItem {
                description: line.description,
                group_key: group_key.unwrap_or_else(|| UNASSIGNED_CLIENT.to_string()),
                currency,
                quantity_hours: line.hours.round_dp(2),
                hourly_rate,
                amount: line.amount,
                worklog_count: line.worklog_count,
            }
        })
        .collect();

    line_items.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.group_key.cmp(&b.group_key))
            .then_with(|| a.currency.cmp(&b.currency))
            .then_with(|| a.description.cmp(&b.description))
    });

    let preview = BillingPreview {
        preview_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        period_start: request.period_start,
        period_end: request.period_end,
        group_by: request.group_by,
        line_items,
        subtotals: totals.subtotals,
        billable_hours: totals.billable_hours.round_dp(2),
        non_billable_hours: totals.non_billable_hours.round_dp(2),
        skipped,
        warnings,
    };

    info!(
        preview_id = %preview.preview_id,
        line_items = preview.line_items.len(),
        billable_hours = %preview.billable_hours,
        non_billable_hours = %preview.non_billable_hours,
        skipped = preview.skipped.len(),
        "Computed billing preview"
    );

    Ok(preview)
}

/// Rates one billable worklog and adds it to the running totals.
fn price_worklog(
    totals: &mut PreviewTotals,
    warnings: &mut Vec<AuditWarning>,
    worklog: &Worklog,
    config: &RateConfig,
    group_by: GroupBy,
) -> CascadeResult<()> {
    let worklog = with_mapped_client(worklog, config);
    let decision = resolve(&worklog, config)?;
    totals.add_rated(&worklog, &decision, group_by)?;

    if decision.rate.is_zero() && decision.matched_level == RateLevel::Default {
        warnings.push(AuditWarning {
            code: ZERO_DEFAULT_RATE_WARNING.to_string(),
            message: format!(
                "Worklog {} on {} fell back to a zero default rate",
                worklog.id, worklog.issue_key
            ),
            severity: "medium".to_string(),
            worklog_id: Some(worklog.id.clone()),
        });
    }
    Ok(())
}

/// Returns the worklog with its client taken from the project mapping when
/// it has none of its own.
fn with_mapped_client<'a>(worklog: &'a Worklog, config: &RateConfig) -> Cow<'a, Worklog> {
    if worklog.client().is_none() && config.client_for_project(&worklog.project_key).is_some() {
        Cow::Owned(worklog.clone().with_client_from(config))
    } else {
        Cow::Borrowed(worklog)
    }
}

/// Returns the group key and line description of a rated worklog.
///
/// The key is `None` only for clientless worklogs grouped by client.
fn group_for(
    worklog: &Worklog,
    decision: &RateDecision,
    group_by: GroupBy,
) -> (Option<String>, String) {
    match group_by {
        GroupBy::Project => (
            Some(worklog.project_key.clone()),
            format!("Project {}", worklog.project_key),
        ),
        GroupBy::Issue => (Some(worklog.issue_key.clone()), worklog.issue_key.clone()),
        GroupBy::Client => match worklog.client() {
            Some(client) => (Some(client.to_string()), format!("Client {}", client)),
            None => (None, "Unassigned client".to_string()),
        },
        GroupBy::Level => (
            Some(decision.matched_level.as_str().to_string()),
            format!("Matched at {}", decision.matched_level),
        ),
    }
}
