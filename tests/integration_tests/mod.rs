//! Integration tests module
//!
//! End-to-end tests for the shiftlog pipeline, including:
//! - Report text → record → repository → period summary
//! - Notes → sections → phrase rankings and spikes
//! - Guided capture with pending-input expiry
//! - Translation annotation against a mock HTTP service

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
pub mod trends_test;
