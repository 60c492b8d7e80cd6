//! Structured shift report parser
//!
//! Turns a loosely formatted block such as
//!
//! ```text
//! Day: 24/01/2026
//! Total Sales Day: 7199,50
//! Visa: 6400,30
//! Cash: 799,20
//! Tips: 103,60
//! Lunch: 2341,30
//! Pax: 50
//! Walk in: 3
//! No show: 7
//! Dinner: 4858,20
//! Pax: 106
//! Walk in: 2
//! No show: 4
//! ```
//!
//! into a [`DailyRecord`]. Parsing is all-or-nothing: any failure names the
//! offending field or section and no partial record escapes.

use chrono::NaiveDate;

use super::error::{ParseError, ParseResult, RequiredField};
use super::labels::{Label, LabelTable};
use super::numbers::{parse_count, parse_date, parse_decimal};
use super::sanitize::sanitize_text;
use crate::config::ParserConfig;
use crate::models::{DailyRecord, Service, ServiceFigures};

/// Maximum number of lines read below a service heading
pub const SERVICE_WINDOW_LINES: usize = 6;

/// One non-empty input line with its resolved label
#[derive(Debug)]
struct Line<'a> {
    label: Option<Label>,
    value: &'a str,
}

/// Partially read service block
#[derive(Debug)]
struct ServiceBlock {
    sales: Option<f64>,
    figures: ServiceFigures,
}

/// Shift report parser bound to a label table
#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    labels: LabelTable,
}

impl ReportParser {
    /// Parser with the built-in label table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with a custom label table
    pub fn with_labels(labels: LabelTable) -> Self {
        Self { labels }
    }

    /// Parser with the built-in labels plus configured synonyms
    pub fn from_config(config: &ParserConfig) -> Self {
        Self::with_labels(LabelTable::with_extra(&config.extra_labels))
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Parse a report that must carry its own `Day` line
    pub fn parse(&self, text: &str) -> ParseResult<DailyRecord> {
        self.parse_for_day(text, None)
    }

    /// Parse a report, falling back to `default_day` when no `Day` line exists
    ///
    /// A `Day` line that is present but malformed is still an error.
    pub fn parse_for_day(&self, text: &str, default_day: Option<NaiveDate>) -> ParseResult<DailyRecord> {
        let clean = sanitize_text(text);
        let lines: Vec<Line<'_>> = clean
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| match self.labels.classify(line) {
                Some(m) => Line {
                    label: Some(m.label),
                    value: m.value,
                },
                None => Line {
                    label: None,
                    value: line,
                },
            })
            .collect();

        let result = self.parse_lines(&lines, default_day);
        match &result {
            Ok(record) => tracing::debug!(
                day = %record.day,
                total_sales = record.total_sales,
                covers = record.covers(),
                "Parsed shift report"
            ),
            Err(e) => tracing::debug!(error = %e, "Rejected shift report"),
        }
        result
    }

    fn parse_lines(&self, lines: &[Line<'_>], default_day: Option<NaiveDate>) -> ParseResult<DailyRecord> {
        let day = match first_value(lines, Label::Day) {
            Some(raw) => parse_date(raw)?,
            None => default_day.ok_or(ParseError::MissingRequiredField(RequiredField::Day))?,
        };

        let total_sales = optional_amount(lines, Label::TotalSales, "total_sales")?;
        let visa = optional_amount(lines, Label::Visa, "visa")?.unwrap_or(0.0);
        let cash = optional_amount(lines, Label::Cash, "cash")?.unwrap_or(0.0);
        let tips = optional_amount(lines, Label::Tips, "tips")?.unwrap_or(0.0);

        let lunch = read_service(lines, Service::Lunch)?;
        let dinner = read_service(lines, Service::Dinner)?;

        let total_sales = match (total_sales, lunch.sales, dinner.sales) {
            (Some(total), _, _) => total,
            (None, None, None) => {
                return Err(ParseError::MissingRequiredField(RequiredField::TotalSales))
            }
            (None, lunch_sales, dinner_sales) => {
                lunch_sales.unwrap_or(0.0) + dinner_sales.unwrap_or(0.0)
            }
        };

        Ok(DailyRecord {
            day,
            total_sales,
            visa,
            cash,
            tips,
            lunch: lunch.figures,
            dinner: dinner.figures,
        })
    }
}

/// Parse with the built-in label table
pub fn parse_report(text: &str) -> ParseResult<DailyRecord> {
    ReportParser::new().parse(text)
}

fn service_label(service: Service) -> Label {
    match service {
        Service::Lunch => Label::Lunch,
        Service::Dinner => Label::Dinner,
    }
}

fn is_service_heading(line: &Line<'_>) -> bool {
    matches!(line.label, Some(Label::Lunch | Label::Dinner))
}

/// Value of the first line carrying `label`, if any
fn first_value<'a>(lines: &[Line<'a>], label: Label) -> Option<&'a str> {
    lines
        .iter()
        .find(|line| line.label == Some(label))
        .map(|line| line.value)
}

/// Top-level amount; an empty value counts as absent
fn optional_amount(lines: &[Line<'_>], label: Label, field: &'static str) -> ParseResult<Option<f64>> {
    match first_value(lines, label) {
        None | Some("") => Ok(None),
        Some(raw) => parse_decimal(raw)
            .map(Some)
            .ok_or_else(|| ParseError::InvalidNumberFormat {
                field,
                value: raw.to_string(),
            }),
    }
}

fn read_service(lines: &[Line<'_>], service: Service) -> ParseResult<ServiceBlock> {
    let incomplete = || ParseError::IncompleteSection(service);
    let fields = ServiceFields::for_service(service);

    let heading = lines
        .iter()
        .position(|line| line.label == Some(service_label(service)))
        .ok_or_else(incomplete)?;

    let sales = match lines[heading].value {
        "" => None,
        raw => Some(parse_decimal(raw).ok_or_else(|| ParseError::InvalidNumberFormat {
            field: fields.sales,
            value: raw.to_string(),
        })?),
    };

    let window: Vec<&Line<'_>> = lines[heading + 1..]
        .iter()
        .take_while(|line| !is_service_heading(line))
        .take(SERVICE_WINDOW_LINES)
        .collect();

    let count = |label: Label, field: &'static str| -> ParseResult<u32> {
        let raw = window
            .iter()
            .find(|line| line.label == Some(label))
            .map(|line| line.value)
            .filter(|value| !value.is_empty())
            .ok_or_else(incomplete)?;
        parse_count(raw).ok_or_else(|| ParseError::InvalidNumberFormat {
            field,
            value: raw.to_string(),
        })
    };

    let pax = count(Label::Pax, fields.pax)?;
    let walkins = count(Label::WalkIn, fields.walkins)?;
    let noshows = count(Label::NoShow, fields.noshows)?;

    Ok(ServiceBlock {
        sales,
        figures: ServiceFigures {
            sales: sales.unwrap_or(0.0),
            pax,
            walkins,
            noshows,
        },
    })
}

/// Record field names for one service, used in error reports
struct ServiceFields {
    sales: &'static str,
    pax: &'static str,
    walkins: &'static str,
    noshows: &'static str,
}

impl ServiceFields {
    fn for_service(service: Service) -> Self {
        match service {
            Service::Lunch => Self {
                sales: "lunch_sales",
                pax: "lunch_pax",
                walkins: "lunch_walkins",
                noshows: "lunch_noshows",
            },
            Service::Dinner => Self {
                sales: "dinner_sales",
                pax: "dinner_pax",
                walkins: "dinner_walkins",
                noshows: "dinner_noshows",
            },
        }
    }
}
