//! Period-over-period phrase trends and spike detection
//!
//! This module provides functionality for:
//! - Counting phrases per note section over a period
//! - Ranking recurring phrases with deltas against the previous period
//! - Flagging spikes with a configurable [`SpikePolicy`]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::phrases::{PhraseCounter, PhraseKind, RankedPhrase};
use super::tokenizer::Tokenizer;
use crate::calendar::{period_ending, Period, PeriodSpec};
use crate::config::Config;
use crate::error::Result;
use crate::notes::{Section, SectionExtractor};
use crate::storage::ReportRepository;

/// Threshold for flagging a phrase as a spike
///
/// A phrase spikes when its latest count is at least `min_count` and exceeds
/// the previous count by at least `min_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikePolicy {
    pub min_count: u32,
    pub min_delta: u32,
}

impl SpikePolicy {
    #[must_use]
    pub fn new(min_count: u32, min_delta: u32) -> Self {
        Self {
            min_count,
            min_delta,
        }
    }

    /// Whether `latest` vs `previous` counts as a spike
    #[must_use]
    pub fn is_spike(&self, latest: u32, previous: u32) -> bool {
        latest >= self.min_count && latest >= previous.saturating_add(self.min_delta)
    }
}

impl Default for SpikePolicy {
    fn default() -> Self {
        Self::new(2, 2)
    }
}

/// Trend direction between two equal-length periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Absent in the previous period
    New,
    Rising,
    Stable,
    Falling,
}

impl TrendDirection {
    #[must_use]
    pub fn from_counts(latest: u32, previous: u32) -> Self {
        if previous == 0 && latest > 0 {
            Self::New
        } else if latest > previous {
            Self::Rising
        } else if latest == previous {
            Self::Stable
        } else {
            Self::Falling
        }
    }
}

/// Spike detection result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spike {
    pub phrase: String,
    pub section: Section,
    /// Count in the latest period
    pub latest: u32,
    /// Count in the previous period
    pub previous: u32,
}

impl Spike {
    #[must_use]
    pub fn delta(&self) -> i64 {
        i64::from(self.latest) - i64::from(self.previous)
    }
}

/// Ranked phrase with its count in the previous period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseDelta {
    pub phrase: String,
    pub kind: PhraseKind,
    pub latest: u32,
    pub previous: u32,
    pub direction: TrendDirection,
}

impl PhraseDelta {
    fn new(ranked: RankedPhrase, previous: &PhraseCounter) -> Self {
        let prev = previous.count(&ranked.phrase);
        Self {
            direction: TrendDirection::from_counts(ranked.count, prev),
            phrase: ranked.phrase,
            kind: ranked.kind,
            latest: ranked.count,
            previous: prev,
        }
    }
}

/// Trends for one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTrend {
    pub section: Section,
    pub top: Vec<PhraseDelta>,
    pub spikes: Vec<Spike>,
}

/// Trends for all sections over a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub period: Period,
    pub previous: Period,
    pub notes: usize,
    pub sections: Vec<SectionTrend>,
}

/// Flag phrases of `latest` that spiked against `previous`
///
/// Bigrams and unigrams are both evaluated. Results are ordered by delta
/// descending, then latest count descending, then phrase.
pub fn spike_detect(
    latest: &PhraseCounter,
    previous: &PhraseCounter,
    section: Section,
    policy: &SpikePolicy,
) -> Vec<Spike> {
    let mut spikes: Vec<Spike> = latest
        .phrases()
        .filter_map(|(phrase, count)| {
            let prev = previous.count(phrase);
            policy.is_spike(count, prev).then(|| Spike {
                phrase: phrase.to_string(),
                section,
                latest: count,
                previous: prev,
            })
        })
        .collect();

    spikes.sort_by(|a, b| {
        b.delta()
            .cmp(&a.delta())
            .then_with(|| b.latest.cmp(&a.latest))
            .then_with(|| a.phrase.cmp(&b.phrase))
    });
    spikes
}

/// Ties the section extractor, tokenizer and spike policy to a note store
#[derive(Debug, Clone)]
pub struct TrendEngine {
    extractor: SectionExtractor,
    tokenizer: Tokenizer,
    policy: SpikePolicy,
    rank_limit: usize,
}

impl TrendEngine {
    pub fn new(
        extractor: SectionExtractor,
        tokenizer: Tokenizer,
        policy: SpikePolicy,
        rank_limit: usize,
    ) -> Self {
        Self {
            extractor,
            tokenizer,
            policy,
            rank_limit,
        }
    }

    /// Engine with the configured word lists, headings and thresholds
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SectionExtractor::with_extra(&config.notes.extra_section_headings),
            Tokenizer::new().with_extra_stopwords(&config.analytics.extra_stopwords),
            config.analytics.spike_policy(),
            config.analytics.rank_limit,
        )
    }

    #[must_use]
    pub fn policy(&self) -> &SpikePolicy {
        &self.policy
    }

    #[must_use]
    pub fn rank_limit(&self) -> usize {
        self.rank_limit
    }

    /// Phrase counts for one section across note texts
    pub fn section_counter<'a, I>(&self, notes: I, section: Section) -> PhraseCounter
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counter = PhraseCounter::default();
        for text in notes {
            let sections = self.extractor.extract(text);
            counter.merge(&PhraseCounter::from_tokens(
                &self.tokenizer.tokenize(sections.get(section)),
            ));
        }
        counter
    }

    fn counters<'a, I>(&self, notes: I) -> BTreeMap<Section, PhraseCounter>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counters: BTreeMap<Section, PhraseCounter> = Section::all()
            .into_iter()
            .map(|s| (s, PhraseCounter::default()))
            .collect();

        for text in notes {
            let sections = self.extractor.extract(text);
            for (section, body) in sections.iter() {
                if body.is_empty() {
                    continue;
                }
                let counter = PhraseCounter::from_tokens(&self.tokenizer.tokenize(body));
                counters.entry(section).or_default().merge(&counter);
            }
        }
        counters
    }

    fn load(&self, store: &dyn ReportRepository, period: &Period) -> Result<Vec<String>> {
        let notes = store.notes_in_period(period)?;
        tracing::debug!(period = %period, notes = notes.len(), "Loaded notes for trend analysis");
        Ok(notes.into_iter().map(|(_, text)| text).collect())
    }

    /// Top phrases of one section over a period
    pub fn top_phrases(
        &self,
        store: &dyn ReportRepository,
        period: &Period,
        section: Section,
        limit: usize,
    ) -> Result<Vec<RankedPhrase>> {
        let notes = self.load(store, period)?;
        Ok(self
            .section_counter(notes.iter().map(String::as_str), section)
            .rank(limit))
    }

    /// Spikes of one section over the period of `spec` ending on `reference_day`
    ///
    /// The comparison window is the equal-length period just before it.
    pub fn spikes(
        &self,
        store: &dyn ReportRepository,
        reference_day: NaiveDate,
        spec: PeriodSpec,
        section: Section,
    ) -> Result<Vec<Spike>> {
        let period = period_ending(reference_day, spec)?;
        let previous = period.previous()?;

        let latest_notes = self.load(store, &period)?;
        let previous_notes = self.load(store, &previous)?;
        let latest = self.section_counter(latest_notes.iter().map(String::as_str), section);
        let before = self.section_counter(previous_notes.iter().map(String::as_str), section);

        let spikes = spike_detect(&latest, &before, section, &self.policy);
        crate::metrics::record_spikes(section.key(), spikes.len());
        Ok(spikes)
    }

    /// Ranked phrases, deltas and spikes for every section
    pub fn section_report(&self, store: &dyn ReportRepository, period: &Period) -> Result<TrendReport> {
        let previous = period.previous()?;
        let latest_notes = self.load(store, period)?;
        let previous_notes = self.load(store, &previous)?;

        let latest = self.counters(latest_notes.iter().map(String::as_str));
        let before = self.counters(previous_notes.iter().map(String::as_str));
        let empty = PhraseCounter::default();

        let sections = Section::all()
            .into_iter()
            .map(|section| {
                let now = latest.get(&section).unwrap_or(&empty);
                let prev = before.get(&section).unwrap_or(&empty);
                let spikes = spike_detect(now, prev, section, &self.policy);
                crate::metrics::record_spikes(section.key(), spikes.len());
                SectionTrend {
                    section,
                    top: now
                        .rank(self.rank_limit)
                        .into_iter()
                        .map(|ranked| PhraseDelta::new(ranked, prev))
                        .collect(),
                    spikes,
                }
            })
            .collect();

        tracing::info!(
            period = %period,
            notes = latest_notes.len(),
            previous_notes = previous_notes.len(),
            "Computed section trends"
        );

        Ok(TrendReport {
            period: *period,
            previous,
            notes: latest_notes.len(),
            sections,
        })
    }
}

impl Default for TrendEngine {
    fn default() -> Self {
        Self::new(
            SectionExtractor::new(),
            Tokenizer::new(),
            SpikePolicy::default(),
            10,
        )
    }
}
