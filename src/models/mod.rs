//! Core data models for the Rate Cascade Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod billing_preview;
mod rate;
mod worklog;

pub use audit::{AuditStep, AuditWarning};
pub use billing_preview::{BillingLineItem, BillingPreview, GroupBy, PreviewRequest, RejectedWorklog};
pub use rate::{FALLBACK_CURRENCY, Rate, RateDecision, RateLevel};
pub use worklog::{Worklog, project_key_from_issue};
