//! shiftlog - Shift report ingestion and note trend analysis
//!
//! Restaurant staff send an end-of-shift sales report and free-form notes
//! through a chat. This crate turns that text into typed records and finds
//! what keeps coming up in the notes.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`calendar`] - Business day attribution, period specs and month arithmetic
//! - [`parser`] - Free-text sales report parsing (English and Spanish labels)
//! - [`notes`] - Note splitting into canonical sections
//! - [`analytics`] - Tokenizer, phrase ranking and spike detection
//! - [`session`] - Pending-input tracking and the guided report flow
//! - [`cache`] - Process-wide translation cache
//! - [`translation`] - Best-effort phrase annotation over HTTP
//! - [`storage`] - Report repository (SQLite, in-memory mock)
//! - [`config`] - Configuration management and settings
//! - [`metrics`] - Prometheus counters
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use shiftlog::config::Config;
//! use shiftlog::parser::ReportParser;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let parser = ReportParser::from_config(&config.parser);
//!     let record = parser.parse("Day: 2026-01-24\nTotal Sales Day: 7199,50")?;
//!     println!("{} covers", record.covers());
//!     Ok(())
//! }
//! ```

// Initialize rust-i18n at crate root level
rust_i18n::i18n!("locales", fallback = "en");

pub mod analytics;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod error;
pub mod i18n;
pub mod metrics;
pub mod models;
pub mod notes;
pub mod parser;
pub mod session;
pub mod storage;
pub mod translation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{SpikePolicy, TrendEngine, TrendReport};
    pub use crate::calendar::{BusinessCalendar, Period, PeriodSpec};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, ShiftlogErrorTrait};
    pub use crate::models::{BusinessDay, DailyRecord, SalesAggregate, Service, Submitter};
    pub use crate::notes::{Section, SectionExtractor, SectionMap};
    pub use crate::parser::{ParseError, ReportParser};
    pub use crate::storage::{ReportRepository, SharedReportRepository};
}

// Direct re-exports for convenience
pub use models::{BusinessDay, DailyRecord, Service, Submitter};
