use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use shiftlog::config::Config;
use shiftlog::i18n::t;
use shiftlog::metrics;
use shiftlog::models::{BusinessDay, Submitter};
use shiftlog::notes::SectionExtractor;
use shiftlog::session::{PendingInputs, PendingKind};

use super::{print_json, read_input, App, SenderArgs};

pub fn notes(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let text = read_input(input.as_deref())?;
    let extractor = SectionExtractor::with_extra(&config.notes.extra_section_headings);

    let sections = {
        let _timer = metrics::start_parse_timer("note");
        extractor.extract(&text)
    };
    print_json(&sections)
}

/// Close an interactive note capture; `None` once it has expired
fn finish_note_capture(pending: &PendingInputs, who: Submitter, now: DateTime<Utc>) -> Option<BusinessDay> {
    pending
        .take(who, now)
        .filter(|input| input.kind == PendingKind::Note)
        .map(|input| input.day)
}

pub fn ingest_note(app: &App, input: Option<PathBuf>, sender: SenderArgs) -> Result<()> {
    app.authorize(&sender)?;
    let who = sender.submitter();
    let day = app.calendar.business_day(sender.received_at()?);

    let (day, text) = match input {
        Some(path) => (day, read_input(Some(path.as_path()))?),
        None => {
            // Typed notes are filed under the day the capture started
            let pending = app.config.pending_inputs();
            pending.put(who, day, PendingKind::Note, Utc::now());
            let text = read_input(None)?;
            match finish_note_capture(&pending, who, Utc::now()) {
                Some(day) => (day, text),
                None => {
                    tracing::info!(day = %day, chat = sender.chat, "Note capture expired");
                    eprintln!("{}", t!("cli.note.expired"));
                    return Ok(());
                }
            }
        }
    };

    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Empty note");
    }

    let stored = app
        .repo
        .upsert_note(day, who, text)
        .with_context(|| format!("Failed to store note for {day}"))?;

    if stored {
        metrics::record_note("stored");
        tracing::info!(day = %day, chat = sender.chat, "Stored note");
        eprintln!("{}", t!("cli.note.stored", day = day.to_string()));
    } else {
        metrics::record_note("duplicate");
        tracing::info!(day = %day, chat = sender.chat, "Ignored duplicate note");
        eprintln!("{}", t!("cli.note.duplicate", day = day.to_string()));
    }

    print_json(&app.extractor.extract(text))
}
