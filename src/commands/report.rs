use anyhow::{Context, Result};
use chrono::Utc;
use std::io::BufRead;
use std::path::PathBuf;

use shiftlog::config::Config;
use shiftlog::error::{Error, ShiftlogErrorTrait};
use shiftlog::i18n::t;
use shiftlog::metrics;
use shiftlog::models::DailyRecord;
use shiftlog::parser::{parse_date, ParseError, ReportParser};
use shiftlog::session::{GuidedReport, GuidedState, PendingKind};

use super::{print_json, read_input, App, SenderArgs};

/// Metrics label for a rejected report
fn rejection_outcome(err: &ParseError) -> &'static str {
    match err {
        ParseError::MissingRequiredField(_) => "missing_field",
        ParseError::IncompleteSection(_) => "incomplete_section",
        ParseError::InvalidDateFormat(_) => "invalid_date",
        ParseError::InvalidNumberFormat { .. } => "invalid_number",
    }
}

fn parse_timed(parser: &ReportParser, text: &str, day: Option<chrono::NaiveDate>) -> Result<DailyRecord> {
    let _timer = metrics::start_parse_timer("report");
    match parser.parse_for_day(text, day) {
        Ok(record) => {
            metrics::record_report_parsed("accepted");
            Ok(record)
        }
        Err(e) => {
            metrics::record_report_parsed(rejection_outcome(&e));
            let reason = Error::from(e.clone()).localized_desc();
            eprintln!("{}", t!("cli.ingest.rejected", reason = reason));
            Err(e.into())
        }
    }
}

pub fn parse(config: &Config, input: Option<PathBuf>, day: Option<String>) -> Result<()> {
    let default_day = day
        .map(|raw| parse_date(&raw).with_context(|| format!("Invalid --day: {raw}")))
        .transpose()?;
    let text = read_input(input.as_deref())?;
    let parser = ReportParser::from_config(&config.parser);

    let record = parse_timed(&parser, &text, default_day)?;
    print_json(&record)
}

pub fn ingest_report(app: &App, input: Option<PathBuf>, sender: SenderArgs) -> Result<()> {
    app.authorize(&sender)?;
    let day = app.calendar.business_day(sender.received_at()?);
    let text = read_input(input.as_deref())?;

    let record = parse_timed(&app.parser, &text, Some(day))?;
    app.repo
        .upsert_daily_record(record.day, &record)
        .with_context(|| format!("Failed to store report for {}", record.day))?;

    tracing::info!(day = %record.day, total_sales = record.total_sales, "Stored daily report");
    eprintln!("{}", t!("cli.ingest.stored", day = record.day.to_string()));
    print_json(&record)
}

/// Interactive capture: one figure per stdin line, then confirmation
pub fn guided(app: &App, sender: SenderArgs) -> Result<()> {
    app.authorize(&sender)?;
    let who = sender.submitter();
    let day = app.calendar.business_day(sender.received_at()?);

    let pending = app.config.pending_inputs();
    pending.put(who, day, PendingKind::Report, Utc::now());

    let mut session = GuidedReport::with_parser(day, app.parser.clone());
    prompt(&session);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;

        if pending.get(who, Utc::now()).is_none() {
            tracing::info!(day = %day, "Guided capture expired");
            eprintln!("{}", t!("cli.guided.cancelled"));
            return Ok(());
        }

        if let Err(e) = session.handle(&line) {
            eprintln!("{}", Error::from(e).localized_desc());
            prompt(&session);
            continue;
        }

        match session.state() {
            GuidedState::Confirmed(_) => break,
            GuidedState::Cancelled => {
                pending.cancel(who);
                eprintln!("{}", t!("cli.guided.cancelled"));
                return Ok(());
            }
            _ => prompt(&session),
        }
    }

    pending.take(who, Utc::now());
    let Some(record) = session.into_record() else {
        eprintln!("{}", t!("cli.guided.cancelled"));
        return Ok(());
    };

    metrics::record_report_parsed("accepted");
    app.repo
        .upsert_daily_record(record.day, &record)
        .with_context(|| format!("Failed to store report for {}", record.day))?;
    eprintln!("{}", t!("cli.ingest.stored", day = record.day.to_string()));
    print_json(&record)
}

fn prompt(session: &GuidedReport) {
    match session.state() {
        GuidedState::Collecting(step) => {
            eprintln!("{}", t!("cli.guided.prompt", step = step.to_string()));
        }
        GuidedState::AwaitingConfirmation => {
            eprintln!("{}", session.draft().to_report_text(session.day()));
            eprintln!("{}", t!("cli.guided.confirm"));
        }
        GuidedState::Confirmed(_) | GuidedState::Cancelled => {}
    }
}
