//! Unigram and bigram counting with ranking

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Below this many distinct bigrams, rankings are backfilled with unigrams
pub const MIN_DISTINCT_BIGRAMS: usize = 5;

/// Phrase to occurrence count
pub type FrequencyMap = HashMap<String, u32>;

/// Bigram and unigram frequencies for a body of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseCounter {
    pub bigrams: FrequencyMap,
    pub unigrams: FrequencyMap,
}

impl PhraseCounter {
    /// Count one token sequence
    pub fn from_tokens(tokens: &[String]) -> Self {
        let (bigrams, unigrams) = count_phrases(tokens);
        Self { bigrams, unigrams }
    }

    /// Fold another counter into this one
    ///
    /// Merging keeps bigrams from spanning two separate texts.
    pub fn merge(&mut self, other: &PhraseCounter) {
        for (phrase, count) in &other.bigrams {
            *self.bigrams.entry(phrase.clone()).or_insert(0) += count;
        }
        for (phrase, count) in &other.unigrams {
            *self.unigrams.entry(phrase.clone()).or_insert(0) += count;
        }
    }

    /// Count for a phrase; phrases containing a space are bigrams
    #[must_use]
    pub fn count(&self, phrase: &str) -> u32 {
        let map = if phrase.contains(' ') {
            &self.bigrams
        } else {
            &self.unigrams
        };
        map.get(phrase).copied().unwrap_or(0)
    }

    /// Every counted phrase with its count, bigrams first
    pub fn phrases(&self) -> impl Iterator<Item = (&str, u32)> {
        self.bigrams
            .iter()
            .chain(self.unigrams.iter())
            .map(|(phrase, count)| (phrase.as_str(), *count))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unigrams.is_empty()
    }

    /// Ranked phrases, see [`rank`]
    #[must_use]
    pub fn rank(&self, limit: usize) -> Vec<RankedPhrase> {
        rank(&self.bigrams, &self.unigrams, limit)
    }
}

/// Whether a ranked entry is a bigram or a unigram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseKind {
    Bigram,
    Unigram,
}

/// A phrase in a ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPhrase {
    pub phrase: String,
    pub count: u32,
    pub kind: PhraseKind,
}

/// Count bigrams and unigrams in a token sequence
///
/// Bigrams are adjacent pairs joined by a single space; a pair of identical
/// tokens (`loud loud`) is not counted.
///
/// # Returns
///
/// `(bigrams, unigrams)`
pub fn count_phrases(tokens: &[String]) -> (FrequencyMap, FrequencyMap) {
    let mut bigrams = FrequencyMap::new();
    let mut unigrams = FrequencyMap::new();

    for token in tokens {
        *unigrams.entry(token.clone()).or_insert(0) += 1;
    }
    for pair in tokens.windows(2) {
        if pair[0] != pair[1] {
            *bigrams.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
        }
    }

    (bigrams, unigrams)
}

fn by_count_then_phrase(a: &(&String, &u32), b: &(&String, &u32)) -> Ordering {
    b.1.cmp(a.1).then_with(|| a.0.cmp(b.0))
}

fn sorted(map: &FrequencyMap) -> Vec<(&String, &u32)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(by_count_then_phrase);
    entries
}

/// Rank phrases by count, ties broken alphabetically
///
/// Bigrams come first. When fewer than [`MIN_DISTINCT_BIGRAMS`] distinct
/// bigrams exist, the list is backfilled with the top unigrams not already
/// present until `limit` is reached.
///
/// # Arguments
///
/// * `bigrams` - bigram counts
/// * `unigrams` - unigram counts
/// * `limit` - maximum entries returned
pub fn rank(bigrams: &FrequencyMap, unigrams: &FrequencyMap, limit: usize) -> Vec<RankedPhrase> {
    let mut ranked: Vec<RankedPhrase> = sorted(bigrams)
        .into_iter()
        .take(limit)
        .map(|(phrase, count)| RankedPhrase {
            phrase: phrase.clone(),
            count: *count,
            kind: PhraseKind::Bigram,
        })
        .collect();

    if bigrams.len() < MIN_DISTINCT_BIGRAMS {
        let seen: HashSet<String> = ranked.iter().map(|r| r.phrase.clone()).collect();
        let room = limit.saturating_sub(ranked.len());
        ranked.extend(
            sorted(unigrams)
                .into_iter()
                .filter(|(phrase, _)| !seen.contains(phrase.as_str()))
                .take(room)
                .map(|(phrase, count)| RankedPhrase {
                    phrase: phrase.clone(),
                    count: *count,
                    kind: PhraseKind::Unigram,
                }),
        );
    }

    ranked
}
