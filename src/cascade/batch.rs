//! Batch resolution.
//!
//! Resolves many worklogs against one configuration snapshot. Worklogs are
//! independent, so an invalid one is skipped and reported instead of
//! failing the whole batch.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::RateConfig;
use crate::models::{RateDecision, RejectedWorklog, Worklog};

use super::resolve;

/// A worklog id paired with its rate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWorklog {
    /// The id of the worklog.
    pub worklog_id: String,
    /// The decision for the worklog.
    pub decision: RateDecision,
}

/// The outcome of resolving a batch of worklogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResolution {
    /// Resolved worklogs, in input order.
    pub resolved: Vec<ResolvedWorklog>,
    /// Worklogs that could not be resolved, in input order.
    pub rejected: Vec<RejectedWorklog>,
}

/// Resolves every worklog in `worklogs` against `config`.
///
/// # Examples
///
/// ```
/// use rate_cascade::cascade::resolve_batch;
/// use rate_cascade::config::RateConfig;
/// use rate_cascade::models::{Rate, Worklog};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = RateConfig::new(Rate::new(Decimal::new(100, 0), "USD"));
/// let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let worklogs = vec![
///     Worklog::new("wl_001", "TECH-1", "TECH", Decimal::ONE, date),
///     Worklog::new("wl_002", "", "TECH", Decimal::ONE, date),
/// ];
///
/// let batch = resolve_batch(&worklogs, &config);
/// assert_eq!(batch.resolved.len(), 1);
/// assert_eq!(batch.rejected[0].worklog_id, "wl_002");
/// ```
pub fn resolve_batch(worklogs: &[Worklog], config: &RateConfig) -> BatchResolution {
    let mut batch = BatchResolution::default();

    for worklog in worklogs {
        match resolve(worklog, config) {
            Ok(decision) => batch.resolved.push(ResolvedWorklog {
                worklog_id: worklog.id.clone(),
                decision,
            }),
            Err(err) => {
                warn!(worklog_id = %worklog.id, error = %err, "Cannot rate worklog");
                batch.rejected.push(RejectedWorklog {
                    worklog_id: worklog.id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        resolved = batch.resolved.len(),
        rejected = batch.rejected.len(),
        "Resolved worklog batch"
    );

    batch
}
