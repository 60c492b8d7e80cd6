//! Conversation state for multi-turn captures
//!
//! - [`pending`] - TTL-bounded map of what each submitter is expected to send next
//! - [`guided`] - step-by-step report capture state machine

pub mod guided;
pub mod pending;

pub use guided::{GuidedError, GuidedReport, GuidedState, GuidedStep, ReportDraft, ServiceDraft};
pub use pending::{PendingInput, PendingInputs, PendingKind};
