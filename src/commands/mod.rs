pub mod notes;
pub mod owners;
pub mod report;
pub mod trends;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use shiftlog::calendar::BusinessCalendar;
use shiftlog::config::Config;
use shiftlog::models::Submitter;
use shiftlog::notes::SectionExtractor;
use shiftlog::parser::{parse_date, ReportParser};
use shiftlog::storage::{open_repository, SharedReportRepository};

// Re-export command functions for convenience
pub use notes::{ingest_note, notes};
pub use owners::set_owners;
pub use report::{guided, ingest_report, parse};
pub use trends::{period, spikes, summary, trends};

/// Who a stored report or note is attributed to
#[derive(Args, Debug, Clone)]
pub struct SenderArgs {
    /// Conversation the message came from
    #[arg(long, default_value = "0")]
    pub chat: i64,

    /// Sending user; required when an allow-list is configured
    #[arg(long)]
    pub user: Option<i64>,

    /// Message time as RFC 3339 (defaults to now)
    #[arg(long)]
    pub at: Option<String>,
}

impl SenderArgs {
    pub fn submitter(&self) -> Submitter {
        Submitter::new(self.chat, self.user.unwrap_or_default())
    }

    pub fn received_at(&self) -> Result<DateTime<Utc>> {
        match &self.at {
            Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid --at timestamp: {raw}"))?
                .with_timezone(&Utc)),
            None => Ok(Utc::now()),
        }
    }
}

/// Everything a storage-backed command needs
pub struct App {
    pub config: Config,
    pub repo: SharedReportRepository,
    pub calendar: BusinessCalendar,
    pub parser: ReportParser,
    pub extractor: SectionExtractor,
}

impl App {
    pub fn open(config: Config) -> Result<Self> {
        let repo = open_repository(&config.storage)
            .with_context(|| format!("Failed to open {}", config.storage.sqlite_path.display()))?;
        Ok(Self {
            calendar: config.business_calendar(),
            parser: ReportParser::from_config(&config.parser),
            extractor: SectionExtractor::with_extra(&config.notes.extra_section_headings),
            repo,
            config,
        })
    }

    /// Reject senders outside the configured allow-list
    pub fn authorize(&self, sender: &SenderArgs) -> Result<()> {
        if !self.config.access.is_allowed(sender.user) {
            tracing::warn!(chat = sender.chat, user = ?sender.user, "Sender not in allow-list");
            anyhow::bail!("User {:?} is not allowed to submit", sender.user);
        }
        Ok(())
    }
}

/// Read a file, or all of stdin when no path is given
pub fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Explicit `--until` day, or the current business day
pub fn until_day(calendar: &BusinessCalendar, until: Option<String>) -> Result<NaiveDate> {
    match until {
        Some(raw) => parse_date(&raw).with_context(|| format!("Invalid --until day: {raw}")),
        None => Ok(calendar.today()),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
