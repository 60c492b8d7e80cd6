//! Unified error handling for the shiftlog crate
//!
//! Domain modules keep their own `thiserror` enums; this module wraps them in
//! a single [`Error`] for code that crosses module boundaries.
//!
//! # Architecture
//!
//! - [`ShiftlogErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use shiftlog::error::{Error, ShiftlogErrorTrait};
//!
//! fn reply(err: Error) -> String {
//!     if err.is_recoverable() {
//!         format!("Please resend: {}", err.localized_desc())
//!     } else {
//!         err.localized_desc()
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::calendar::CalendarError;
pub use crate::config::ConfigError;
pub use crate::parser::ParseError;
pub use crate::session::GuidedError;

use crate::i18n::t;

/// Common trait for shiftlog error types
pub trait ShiftlogErrorTrait: std::error::Error {
    /// Whether the submitter can fix this by resending (or a retry may succeed)
    fn is_recoverable(&self) -> bool;

    /// Description in the active locale for user-facing messages
    fn localized_desc(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Submitted text could not be read
    Parsing,
    /// Dates, periods and other values out of bounds
    Validation,
    /// Repository failures
    Storage,
    /// Configuration errors
    Config,
}

impl ErrorCategory {
    /// Get localized description for the category
    pub fn localized_desc(&self) -> String {
        match self {
            Self::Parsing => t!("errors.category.parsing").to_string(),
            Self::Validation => t!("errors.category.validation").to_string(),
            Self::Storage => t!("errors.category.storage").to_string(),
            Self::Config => t!("errors.category.config").to_string(),
        }
    }
}

/// Unified error type for the shiftlog crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Guided capture error: {0}")]
    Guided(#[from] GuidedError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Repository failures carrying their own context chain
    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

fn parse_desc(err: &ParseError) -> String {
    match err {
        ParseError::MissingRequiredField(field) => {
            t!("errors.parse.missing_field", field = field.as_str()).to_string()
        }
        ParseError::IncompleteSection(service) => {
            t!("errors.parse.incomplete_section", section = service.as_str()).to_string()
        }
        ParseError::InvalidDateFormat(value) => {
            t!("errors.parse.invalid_date", value = value).to_string()
        }
        ParseError::InvalidNumberFormat { field, value } => {
            t!("errors.parse.invalid_number", field = field, value = value).to_string()
        }
    }
}

fn guided_desc(err: &GuidedError) -> String {
    match err {
        GuidedError::InvalidNumber { step, value } => {
            t!("errors.guided.invalid_number", step = step.key(), value = value).to_string()
        }
        GuidedError::SkipNotAllowed(step) => {
            t!("errors.guided.skip_not_allowed", step = step.key()).to_string()
        }
        GuidedError::UnexpectedConfirmation(_) => t!("errors.guided.confirmation").to_string(),
        GuidedError::Finished => t!("errors.guided.finished").to_string(),
        GuidedError::Rejected(e) => parse_desc(e),
    }
}

fn calendar_desc(err: &CalendarError) -> String {
    match err {
        CalendarError::InvalidPeriodSpec(spec) => {
            t!("errors.calendar.invalid_period_spec", spec = spec).to_string()
        }
        CalendarError::InvalidPeriod { .. } | CalendarError::OutOfRange(_) => {
            format!("{}: {err}", t!("errors.calendar.error"))
        }
    }
}

impl ShiftlogErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Calendar(_) | Self::Parse(_) => true,
            Self::Guided(e) => !matches!(e, GuidedError::Finished),
            Self::Config(_) | Self::Storage(_) => false,
        }
    }

    fn localized_desc(&self) -> String {
        match self {
            Self::Calendar(e) => calendar_desc(e),
            Self::Parse(e) => parse_desc(e),
            Self::Guided(e) => guided_desc(e),
            Self::Config(e) => format!("{}: {e}", t!("errors.config.error")),
            Self::Storage(e) => format!("{}: {e:#}", t!("errors.database.error")),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Parse(_) | Self::Guided(_) => ErrorCategory::Parsing,
            Self::Calendar(_) => ErrorCategory::Validation,
            Self::Config(_) => ErrorCategory::Config,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Service;
    use crate::parser::RequiredField;
    use crate::session::GuidedStep;
    use serial_test::serial;

    #[test]
    fn test_error_category() {
        let err = Error::Parse(ParseError::IncompleteSection(Service::Dinner));
        assert_eq!(err.category(), ErrorCategory::Parsing);

        let err: Error = CalendarError::InvalidPeriodSpec("0M".into()).into();
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err: Error = anyhow::anyhow!("disk full").into();
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_is_recoverable() {
        let err = Error::Parse(ParseError::MissingRequiredField(RequiredField::Day));
        assert!(err.is_recoverable());

        let err = Error::Guided(GuidedError::Finished);
        assert!(!err.is_recoverable());

        let err = Error::Config(ConfigError::Zero { field: "rank_limit" });
        assert!(!err.is_recoverable());
    }

    #[test]
    #[serial]
    fn test_localized_desc_names_subject() {
        crate::i18n::set_locale("en");
        let err = Error::Parse(ParseError::IncompleteSection(Service::Dinner));
        assert!(err.localized_desc().contains("Dinner"));

        let err = Error::Guided(GuidedError::SkipNotAllowed(GuidedStep::Visa));
        assert!(err.localized_desc().contains("visa"));
    }

    #[test]
    fn test_error_conversion() {
        let unified: Error = ParseError::InvalidDateFormat("32/13/2026".into()).into();
        assert!(matches!(unified, Error::Parse(_)));

        let unified: Error = GuidedError::Rejected(ParseError::IncompleteSection(Service::Lunch)).into();
        assert!(matches!(unified, Error::Guided(_)));
    }

    #[test]
    #[serial]
    fn test_config_error_localized() {
        crate::i18n::set_locale("en");
        let err = Error::from(ConfigError::Zero { field: "rank_limit" });
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(err.localized_desc().starts_with("Invalid configuration"));
        assert!(err.localized_desc().contains("rank_limit"));
    }
}
