//! Trend and spike tests over stored notes
//!
//! Latest window is 2026-01-08..=2026-01-14, the comparison window
//! 2026-01-01..=2026-01-07.

use shiftlog::analytics::{PhraseKind, SpikePolicy, TrendDirection, TrendEngine};
use shiftlog::calendar::{period_ending, PeriodSpec};
use shiftlog::config::Config;
use shiftlog::notes::Section;
use shiftlog::storage::{MockReportRepository, ReportRepository, SqliteReportRepository};

use super::fixtures::{day, repo, store_notes, LOUD_MUSIC_NOTE, QUIET_NOTE, SPANISH_NOTE};

fn seeded() -> SqliteReportRepository {
    let repo = repo();
    store_notes(&repo, &[day(2026, 1, 9), day(2026, 1, 11), day(2026, 1, 13)], LOUD_MUSIC_NOTE);
    store_notes(&repo, &[day(2026, 1, 3)], LOUD_MUSIC_NOTE);
    store_notes(&repo, &[day(2026, 1, 10)], SPANISH_NOTE);
    store_notes(&repo, &[day(2026, 1, 2), day(2026, 1, 12)], QUIET_NOTE);
    repo
}

fn phrases<T, F: Fn(&T) -> &str>(items: &[T], f: F) -> Vec<&str> {
    items.iter().map(f).collect()
}

#[test]
fn test_complaint_spikes() {
    let repo = seeded();
    let engine = TrendEngine::default();

    let spikes = engine
        .spikes(&repo, day(2026, 1, 14), PeriodSpec::Days(7), Section::Complaints)
        .unwrap();

    assert_eq!(
        phrases(&spikes, |s| s.phrase.as_str()),
        vec!["loud", "loud terrace", "music", "music loud", "terrace"]
    );
    assert!(spikes.iter().all(|s| s.latest == 3 && s.previous == 1));
}

#[test]
fn test_stricter_policy_flags_nothing() {
    let repo = seeded();
    let mut config = Config::default();
    config.analytics.spike_min_delta = 3;
    let engine = TrendEngine::from_config(&config);
    assert_eq!(engine.policy(), &SpikePolicy::new(2, 3));

    let spikes = engine
        .spikes(&repo, day(2026, 1, 14), PeriodSpec::Days(7), Section::Complaints)
        .unwrap();
    assert!(spikes.is_empty());
}

#[test]
fn test_top_phrases_backfill_unigrams() {
    let repo = seeded();
    let engine = TrendEngine::default();
    let period = period_ending(day(2026, 1, 14), PeriodSpec::Days(7)).unwrap();

    let top = engine
        .top_phrases(&repo, &period, Section::Complaints, 6)
        .unwrap();
    assert_eq!(
        phrases(&top, |r| r.phrase.as_str()),
        vec!["loud terrace", "music loud", "alta terraza", "música alta", "loud", "music"]
    );
    assert_eq!(top[0].kind, PhraseKind::Bigram);
    assert_eq!(top[5].kind, PhraseKind::Unigram);
}

#[test]
fn test_ranking_is_deterministic_across_backends() {
    let sqlite = seeded();
    let mock = MockReportRepository::new();
    for (d, text) in sqlite
        .notes_in_period(&period_ending(day(2026, 1, 14), PeriodSpec::Days(14)).unwrap())
        .unwrap()
    {
        mock.upsert_note(d, super::fixtures::staff(0), &text).unwrap();
    }

    let engine = TrendEngine::default();
    let period = period_ending(day(2026, 1, 14), PeriodSpec::Days(7)).unwrap();
    let a = engine.section_report(&sqlite, &period).unwrap();
    let b = engine.section_report(&mock, &period).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_section_report() {
    let repo = seeded();
    let engine = TrendEngine::default();
    let period = period_ending(day(2026, 1, 14), PeriodSpec::Days(7)).unwrap();

    let report = engine.section_report(&repo, &period).unwrap();
    assert_eq!(report.notes, 5);
    assert_eq!(report.previous.start(), day(2026, 1, 1));
    assert_eq!(report.sections.len(), 4);

    let complaints = report
        .sections
        .iter()
        .find(|s| s.section == Section::Complaints)
        .unwrap();
    assert_eq!(complaints.top[0].phrase, "loud terrace");
    assert_eq!(complaints.top[0].direction, TrendDirection::Rising);

    let incidents = report
        .sections
        .iter()
        .find(|s| s.section == Section::Incidents)
        .unwrap();
    assert_eq!(
        phrases(&incidents.spikes, |s| s.phrase.as_str()),
        vec!["dishwasher", "dishwasher leaking", "leaking"]
    );

    let sold_out = report
        .sections
        .iter()
        .find(|s| s.section == Section::SoldOut)
        .unwrap();
    assert_eq!(sold_out.top[0].phrase, "tiramisu");
    assert_eq!(sold_out.top[0].direction, TrendDirection::Stable);
    assert!(sold_out.spikes.is_empty());
}

#[test]
fn test_empty_store_has_no_trends() {
    let repo = repo();
    let engine = TrendEngine::default();
    let period = period_ending(day(2026, 1, 14), PeriodSpec::Days(7)).unwrap();

    let report = engine.section_report(&repo, &period).unwrap();
    assert_eq!(report.notes, 0);
    assert!(report.sections.iter().all(|s| s.top.is_empty() && s.spikes.is_empty()));
}
