//! Test fixtures for integration tests
//!
//! Provides sample report and note texts and helper functions

use chrono::NaiveDate;
use shiftlog::models::Submitter;
use shiftlog::storage::{ReportRepository, SqliteReportRepository};

/// Full report for one day, Day line included
pub fn report_text(day: NaiveDate, lunch: &str, dinner: &str) -> String {
    format!(
        "Day: {day}\nVisa: 100\nCash: 50\nTips: 5\n\
         Lunch: {lunch}\nPax: 10\nWalk in: 1\nNo show: 0\n\
         Dinner: {dinner}\nPax: 20\nWalk in: 2\nNo show: 1"
    )
}

/// A complaint-heavy note in English
pub const LOUD_MUSIC_NOTE: &str = "Incidents:
Dishwasher leaking again
Complaints:
Music loud on terrace";

/// A Spanish note with the same complaint
pub const SPANISH_NOTE: &str = "Incidencias:
Nada
Quejas:
Música alta en terraza";

/// A quiet night
pub const QUIET_NOTE: &str = "Sold out:
Tiramisu
Staff:
Everyone on time";

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn staff(user_id: i64) -> Submitter {
    Submitter::new(-1001, user_id)
}

/// Fresh in-memory SQLite repository
pub fn repo() -> SqliteReportRepository {
    SqliteReportRepository::in_memory().unwrap()
}

/// Store `text` once per day in `days`
pub fn store_notes(repo: &dyn ReportRepository, days: &[NaiveDate], text: &str) {
    for (i, d) in days.iter().enumerate() {
        assert!(repo.upsert_note(*d, staff(i as i64), text).unwrap());
    }
}
