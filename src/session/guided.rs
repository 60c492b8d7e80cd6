//! Guided report capture
//!
//! A step-by-step alternative to pasting the whole report template: the
//! session asks for one figure per message, then shows the assembled report
//! for confirmation. Confirmation runs the draft through the same
//! [`ReportParser`] used for pasted reports, so both paths validate alike.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use crate::models::{BusinessDay, DailyRecord, Service};
use crate::parser::{parse_count, parse_decimal, ParseError, ReportParser};

const SKIP_WORDS: &[&str] = &["skip", "saltar", "-"];
const CANCEL_WORDS: &[&str] = &["cancel", "cancelar", "/cancel"];
const CONFIRM_WORDS: &[&str] = &["yes", "y", "ok", "confirm", "si", "sí", "confirmar"];
const RESTART_WORDS: &[&str] = &["no", "edit", "editar", "restart"];

/// Errors from a guided capture; the session state is unchanged
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuidedError {
    #[error("Invalid number for {step}: {value:?}")]
    InvalidNumber { step: GuidedStep, value: String },

    #[error("{0} cannot be skipped")]
    SkipNotAllowed(GuidedStep),

    #[error("Expected yes, no or cancel, got {0:?}")]
    UnexpectedConfirmation(String),

    #[error("Capture already finished")]
    Finished,

    #[error("Report rejected: {0}")]
    Rejected(#[from] ParseError),
}

/// One prompt of the guided flow, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidedStep {
    TotalSales,
    Visa,
    Cash,
    Tips,
    LunchSales,
    LunchPax,
    LunchWalkIns,
    LunchNoShows,
    DinnerSales,
    DinnerPax,
    DinnerWalkIns,
    DinnerNoShows,
}

impl GuidedStep {
    pub const FIRST: Self = Self::TotalSales;

    /// Step that follows, `None` after the last one
    pub fn next(self) -> Option<Self> {
        use GuidedStep::*;
        match self {
            TotalSales => Some(Visa),
            Visa => Some(Cash),
            Cash => Some(Tips),
            Tips => Some(LunchSales),
            LunchSales => Some(LunchPax),
            LunchPax => Some(LunchWalkIns),
            LunchWalkIns => Some(LunchNoShows),
            LunchNoShows => Some(DinnerSales),
            DinnerSales => Some(DinnerPax),
            DinnerPax => Some(DinnerWalkIns),
            DinnerWalkIns => Some(DinnerNoShows),
            DinnerNoShows => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::TotalSales => "total_sales",
            Self::Visa => "visa",
            Self::Cash => "cash",
            Self::Tips => "tips",
            Self::LunchSales => "lunch_sales",
            Self::LunchPax => "lunch_pax",
            Self::LunchWalkIns => "lunch_walkins",
            Self::LunchNoShows => "lunch_noshows",
            Self::DinnerSales => "dinner_sales",
            Self::DinnerPax => "dinner_pax",
            Self::DinnerWalkIns => "dinner_walkins",
            Self::DinnerNoShows => "dinner_noshows",
        }
    }

    /// Head counts take integers; every other step takes an amount
    pub fn is_count(self) -> bool {
        matches!(
            self,
            Self::LunchPax
                | Self::LunchWalkIns
                | Self::LunchNoShows
                | Self::DinnerPax
                | Self::DinnerWalkIns
                | Self::DinnerNoShows
        )
    }

    /// Only the total may be skipped; it is then derived from service sales
    pub fn is_skippable(self) -> bool {
        self == Self::TotalSales
    }
}

impl std::fmt::Display for GuidedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Figures collected for one service
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDraft {
    pub sales: Option<f64>,
    pub pax: Option<u32>,
    pub walkins: Option<u32>,
    pub noshows: Option<u32>,
}

/// Figures collected so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub total_sales: Option<f64>,
    pub visa: Option<f64>,
    pub cash: Option<f64>,
    pub tips: Option<f64>,
    pub lunch: ServiceDraft,
    pub dinner: ServiceDraft,
}

impl ReportDraft {
    fn set_amount(&mut self, step: GuidedStep, value: Option<f64>) {
        match step {
            GuidedStep::TotalSales => self.total_sales = value,
            GuidedStep::Visa => self.visa = value,
            GuidedStep::Cash => self.cash = value,
            GuidedStep::Tips => self.tips = value,
            GuidedStep::LunchSales => self.lunch.sales = value,
            GuidedStep::DinnerSales => self.dinner.sales = value,
            _ => {}
        }
    }

    fn set_count(&mut self, step: GuidedStep, value: u32) {
        match step {
            GuidedStep::LunchPax => self.lunch.pax = Some(value),
            GuidedStep::LunchWalkIns => self.lunch.walkins = Some(value),
            GuidedStep::LunchNoShows => self.lunch.noshows = Some(value),
            GuidedStep::DinnerPax => self.dinner.pax = Some(value),
            GuidedStep::DinnerWalkIns => self.dinner.walkins = Some(value),
            GuidedStep::DinnerNoShows => self.dinner.noshows = Some(value),
            _ => {}
        }
    }

    /// Render as the canonical report template
    ///
    /// Figures not collected are left out, so the parser decides what an
    /// incomplete draft means.
    pub fn to_report_text(&self, day: BusinessDay) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Day: {}", day.format("%Y-%m-%d"));
        let amounts = [
            ("Total Sales Day", self.total_sales),
            ("Visa", self.visa),
            ("Cash", self.cash),
            ("Tips", self.tips),
        ];
        for (label, value) in amounts {
            if let Some(value) = value {
                let _ = writeln!(out, "{label}: {value}");
            }
        }
        for service in Service::all() {
            let draft = match service {
                Service::Lunch => &self.lunch,
                Service::Dinner => &self.dinner,
            };
            match draft.sales {
                Some(sales) => {
                    let _ = writeln!(out, "{service}: {sales}");
                }
                None => {
                    let _ = writeln!(out, "{service}:");
                }
            }
            let counts = [
                ("Pax", draft.pax),
                ("Walk in", draft.walkins),
                ("No show", draft.noshows),
            ];
            for (label, value) in counts {
                if let Some(value) = value {
                    let _ = writeln!(out, "{label}: {value}");
                }
            }
        }
        out
    }
}

/// Where a guided capture stands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuidedState {
    Collecting(GuidedStep),
    AwaitingConfirmation,
    Confirmed(DailyRecord),
    Cancelled,
}

impl GuidedState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed(_) | Self::Cancelled)
    }
}

/// Finite-state machine for one guided report capture
#[derive(Debug, Clone)]
pub struct GuidedReport {
    day: BusinessDay,
    draft: ReportDraft,
    state: GuidedState,
    parser: ReportParser,
}

impl GuidedReport {
    /// Start a capture for a business day
    pub fn new(day: BusinessDay) -> Self {
        Self::with_parser(day, ReportParser::new())
    }

    pub fn with_parser(day: BusinessDay, parser: ReportParser) -> Self {
        Self {
            day,
            draft: ReportDraft::default(),
            state: GuidedState::Collecting(GuidedStep::FIRST),
            parser,
        }
    }

    pub fn day(&self) -> BusinessDay {
        self.day
    }

    pub fn state(&self) -> &GuidedState {
        &self.state
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    /// Consume one message and advance
    ///
    /// On error the state and draft are left as they were, so the same
    /// prompt can be answered again.
    pub fn handle(&mut self, message: &str) -> Result<&GuidedState, GuidedError> {
        let input = message.trim();
        let word = input.to_lowercase();

        if self.state.is_terminal() {
            return Err(GuidedError::Finished);
        }
        if CANCEL_WORDS.contains(&word.as_str()) {
            tracing::debug!(day = %self.day, "Guided capture cancelled");
            self.state = GuidedState::Cancelled;
            return Ok(&self.state);
        }

        match self.state.clone() {
            GuidedState::Collecting(step) => self.collect(step, input, &word)?,
            GuidedState::AwaitingConfirmation => self.confirm(&word)?,
            GuidedState::Confirmed(_) | GuidedState::Cancelled => return Err(GuidedError::Finished),
        }
        Ok(&self.state)
    }

    fn collect(&mut self, step: GuidedStep, input: &str, word: &str) -> Result<(), GuidedError> {
        if SKIP_WORDS.contains(&word) {
            if !step.is_skippable() {
                return Err(GuidedError::SkipNotAllowed(step));
            }
            self.draft.set_amount(step, None);
        } else if step.is_count() {
            let count = parse_count(input).ok_or_else(|| GuidedError::InvalidNumber {
                step,
                value: input.to_string(),
            })?;
            self.draft.set_count(step, count);
        } else {
            let amount = parse_decimal(input).ok_or_else(|| GuidedError::InvalidNumber {
                step,
                value: input.to_string(),
            })?;
            self.draft.set_amount(step, Some(amount));
        }

        self.state = match step.next() {
            Some(next) => GuidedState::Collecting(next),
            None => GuidedState::AwaitingConfirmation,
        };
        Ok(())
    }

    fn confirm(&mut self, word: &str) -> Result<(), GuidedError> {
        if CONFIRM_WORDS.contains(&word) {
            let record = self
                .parser
                .parse_for_day(&self.draft.to_report_text(self.day), Some(self.day))?;
            tracing::debug!(day = %self.day, total_sales = record.total_sales, "Guided capture confirmed");
            self.state = GuidedState::Confirmed(record);
            Ok(())
        } else if RESTART_WORDS.contains(&word) {
            self.draft = ReportDraft::default();
            self.state = GuidedState::Collecting(GuidedStep::FIRST);
            Ok(())
        } else {
            Err(GuidedError::UnexpectedConfirmation(word.to_string()))
        }
    }

    /// Record produced by a confirmed capture
    pub fn into_record(self) -> Option<DailyRecord> {
        match self.state {
            GuidedState::Confirmed(record) => Some(record),
            _ => None,
        }
    }
}
