//! Shift report parsing
//!
//! This module turns chat-submitted report text into typed records:
//!
//! - [`sanitize`] - strips chat-client noise before matching
//! - [`numbers`] - locale-tolerant decimal, count and date literals
//! - [`labels`] - label synonym table and line classifier
//! - [`report`] - the all-or-nothing report parser
//! - [`error`] - failure taxonomy naming the offending field or section

pub mod error;
pub mod labels;
pub mod numbers;
pub mod report;
pub mod sanitize;

pub use error::{ParseError, ParseResult, RequiredField};
pub use labels::{Label, LabelMatch, LabelTable};
pub use numbers::{parse_count, parse_date, parse_decimal};
pub use report::{parse_report, ReportParser};
