//! Report and note pipeline integration tests
//!
//! Tests the complete flow:
//! 1. Parse submitted text into a record
//! 2. Store it for its business day
//! 3. Read it back and summarize over periods

use chrono::{Duration, TimeZone, Utc};
use shiftlog::calendar::{parse_period_spec, period_ending, BusinessCalendar, Period};
use shiftlog::config::StorageConfig;
use shiftlog::parser::{parse_report, ReportParser};
use shiftlog::session::{GuidedReport, GuidedState, PendingInputs, PendingKind};
use shiftlog::storage::{open_repository, ReportRepository};
use tempfile::TempDir;

use super::fixtures::{day, repo, report_text, staff, LOUD_MUSIC_NOTE};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ============================================================================
// Report Pipeline Tests
// ============================================================================

#[test]
fn test_report_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        sqlite_path: dir.path().join("shiftlog.db"),
    };

    let record = parse_report(&report_text(day(2026, 1, 5), "300", "600,50")).unwrap();
    {
        let repo = open_repository(&config).unwrap();
        repo.upsert_daily_record(record.day, &record).unwrap();
    }

    let repo = open_repository(&config).unwrap();
    let stored = repo.get_daily_record(day(2026, 1, 5)).unwrap().unwrap();
    assert_eq!(stored, record);
    assert!(close(stored.total_sales, 900.50));
}

#[test]
fn test_resubmission_overwrites_day() {
    let repo = repo();
    let first = parse_report(&report_text(day(2026, 1, 5), "300", "600")).unwrap();
    let corrected = parse_report(&report_text(day(2026, 1, 5), "350", "600")).unwrap();

    repo.upsert_daily_record(first.day, &first).unwrap();
    repo.upsert_daily_record(corrected.day, &corrected).unwrap();

    let stored = repo.get_daily_record(day(2026, 1, 5)).unwrap().unwrap();
    assert!(close(stored.total_sales, 950.0));
}

#[test]
fn test_period_summary() {
    let repo = repo();
    for d in 1..=10 {
        let record = parse_report(&report_text(day(2026, 3, d), "100", "200")).unwrap();
        repo.upsert_daily_record(record.day, &record).unwrap();
    }

    let week = period_ending(day(2026, 3, 10), parse_period_spec("7").unwrap()).unwrap();
    let aggregate = repo.sum_records(&week).unwrap();
    assert_eq!(aggregate.days_reported, 7);
    assert!(close(aggregate.total_sales, 2100.0));
    assert_eq!(aggregate.covers, 7 * 30);
    assert!(close(aggregate.avg_ticket(), 10.0));

    let month = period_ending(day(2026, 3, 31), parse_period_spec("1M").unwrap()).unwrap();
    assert_eq!(repo.sum_records(&month).unwrap().days_reported, 10);

    let february = Period::new(day(2026, 2, 1), day(2026, 2, 28)).unwrap();
    assert_eq!(repo.sum_records(&february).unwrap().days_reported, 0);
}

#[test]
fn test_late_night_report_lands_on_service_day() {
    let calendar = BusinessCalendar::with_offset_minutes(11, 60);
    // 01:15 local on Jan 6
    let received = Utc.with_ymd_and_hms(2026, 1, 6, 0, 15, 0).unwrap();
    let business_day = calendar.business_day(received);
    assert_eq!(business_day, day(2026, 1, 5));

    let text = report_text(day(2026, 1, 5), "300", "600").replace("Day: 2026-01-05\n", "");
    let record = ReportParser::new()
        .parse_for_day(&text, Some(business_day))
        .unwrap();
    assert_eq!(record.day, day(2026, 1, 5));
}

// ============================================================================
// Notes
// ============================================================================

#[test]
fn test_duplicate_note_is_ignored() {
    let repo = repo();
    assert!(repo.upsert_note(day(2026, 1, 5), staff(1), LOUD_MUSIC_NOTE).unwrap());
    assert!(!repo.upsert_note(day(2026, 1, 5), staff(1), LOUD_MUSIC_NOTE).unwrap());
    assert!(repo.upsert_note(day(2026, 1, 5), staff(2), LOUD_MUSIC_NOTE).unwrap());

    let notes = repo.notes_in_period(&Period::single(day(2026, 1, 5))).unwrap();
    assert_eq!(notes.len(), 2);
}

#[test]
fn test_settings_and_owner_chats() {
    let repo = repo();
    assert_eq!(repo.get_setting("summary_hour").unwrap(), None);
    repo.set_setting("summary_hour", "23").unwrap();
    assert_eq!(repo.get_setting("summary_hour").unwrap(), Some("23".to_string()));

    assert!(repo.add_owner_chat(42).unwrap());
    assert!(!repo.add_owner_chat(42).unwrap());
    assert!(repo.add_owner_chat(-7).unwrap());
    assert_eq!(repo.owner_chats().unwrap(), vec![-7, 42]);
}

// ============================================================================
// Guided Capture
// ============================================================================

#[test]
fn test_guided_capture_matches_pasted_report() {
    let pasted = parse_report(&report_text(day(2026, 1, 5), "300", "600")).unwrap();

    let mut session = GuidedReport::new(day(2026, 1, 5));
    for answer in [
        "900", "100", "50", "5", "300", "10", "1", "0", "600", "20", "2", "1",
    ] {
        session.handle(answer).unwrap();
    }
    assert_eq!(session.state(), &GuidedState::AwaitingConfirmation);
    session.handle("yes").unwrap();

    let record = session.into_record().unwrap();
    assert_eq!(record, pasted);

    let repo = repo();
    repo.upsert_daily_record(record.day, &record).unwrap();
    assert!(repo.get_daily_record(day(2026, 1, 5)).unwrap().is_some());
}

#[test]
fn test_guided_capture_with_skipped_total() {
    let mut session = GuidedReport::new(day(2026, 1, 5));
    for answer in [
        "skip", "100", "50", "5", "300,5", "10", "1", "0", "600", "20", "2", "1", "sí",
    ] {
        session.handle(answer).unwrap();
    }
    let record = session.into_record().unwrap();
    assert!(close(record.total_sales, 900.5));
}

#[test]
fn test_pending_capture_expires() {
    let pending = PendingInputs::with_ttl_minutes(30);
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 22, 0, 0).unwrap();
    pending.put(staff(1), day(2026, 1, 5), PendingKind::Report, start);
    pending.put(staff(2), day(2026, 1, 5), PendingKind::Note, start + Duration::minutes(20));

    let later = start + Duration::minutes(31);
    assert!(pending.get(staff(1), later).is_none());
    let note = pending.take(staff(2), later).unwrap();
    assert_eq!(note.kind, PendingKind::Note);
    assert!(pending.is_empty());
}
