//! Rate Cascade Engine for worklog billing
//!
//! This crate resolves the hourly billing rate of a logged unit of work by
//! walking six prioritized configuration levels (package, issue, epic,
//! project, client, default) and stopping at the first match. It also
//! loads rate configuration from YAML and builds billing previews from
//! batches of resolved worklogs.

#![warn(missing_docs)]

pub mod billing;
pub mod cascade;
pub mod config;
pub mod error;
pub mod models;
