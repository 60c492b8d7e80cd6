//! Error types for report parsing
//!
//! Every variant names the field or section at fault so the caller can ask
//! the submitter to resend only what was wrong.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::models::Service;

/// Fields whose absence rejects a report outright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Day,
    TotalSales,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::TotalSales => "total_sales",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while parsing a shift report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A required field is absent and cannot be derived
    #[error("Missing required field: {0}")]
    MissingRequiredField(RequiredField),

    /// A service block lacks its heading or one of Pax / Walk in / No show
    #[error("Incomplete section: {0}")]
    IncompleteSection(Service),

    /// The day value is neither YYYY-MM-DD nor DD/MM/YYYY
    #[error("Invalid date format: {0:?}")]
    InvalidDateFormat(String),

    /// A numeric value could not be read
    #[error("Invalid number format for {field}: {value:?}")]
    InvalidNumberFormat { field: &'static str, value: String },
}

impl ParseError {
    /// Name of the offending field or section
    pub fn subject(&self) -> String {
        match self {
            Self::MissingRequiredField(field) => field.to_string(),
            Self::IncompleteSection(service) => service.to_string(),
            Self::InvalidDateFormat(_) => RequiredField::Day.to_string(),
            Self::InvalidNumberFormat { field, .. } => (*field).to_string(),
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
