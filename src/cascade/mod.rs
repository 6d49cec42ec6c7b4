//! Rate cascade resolution for the Rate Cascade Engine.
//!
//! This module contains the resolver that picks a worklog's hourly rate
//! from six prioritized levels (package, issue, epic, project, client,
//! default), an audited variant that records every level it checked, and
//! batch resolution over many worklogs.
//!
//! Every function here is pure: it reads the worklog and the configuration
//! snapshot it is given and nothing else, so callers may resolve from many
//! threads against one shared `&RateConfig`.

mod batch;
mod resolver;

pub use batch::{BatchResolution, ResolvedWorklog, resolve_batch};
pub use resolver::{ResolutionResult, resolve, resolve_with_audit};
