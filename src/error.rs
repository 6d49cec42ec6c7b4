//! Error types for the Rate Cascade Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading rate configuration
//! or resolving worklog rates.

use thiserror::Error;

use crate::models::RateLevel;

/// The main error type for the Rate Cascade Engine.
///
/// A cascade that finds no configured rate is not an error: it ends at the
/// default level. Errors are reserved for malformed input and configuration.
///
/// # Example
///
/// ```
/// use rate_cascade::error::CascadeError;
///
/// let error = CascadeError::InvalidInput {
///     field: "issue_key".to_string(),
///     message: "must not be empty".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid input 'issue_key': must not be empty");
/// ```
#[derive(Debug, Error)]
pub enum CascadeError {
    /// A worklog or request was missing a required field or was inconsistent.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configured rate record failed validation.
    #[error("Invalid {level} rate '{key}': {message}")]
    InvalidRate {
        /// The cascade level of the record.
        level: RateLevel,
        /// The key of the record (package id, issue key, ...).
        key: String,
        /// A description of what made the record invalid.
        message: String,
    },

    /// A monetary calculation could not be carried out.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl CascadeError {
    /// Builds a [`CascadeError::InvalidInput`] for a required field that was empty.
    pub(crate) fn empty_field(field: &str) -> Self {
        CascadeError::InvalidInput {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        }
    }
}

/// A type alias for Results that return CascadeError.
pub type CascadeResult<T> = Result<T, CascadeError>;
