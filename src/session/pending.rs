//! Pending multi-turn inputs
//!
//! When a user starts a capture ("send me tonight's report"), the target
//! business day and capture kind are parked here until their next message
//! arrives. Entries expire after a TTL; expired entries are swept on every
//! lookup, so a stale capture never swallows an unrelated message.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{BusinessDay, Submitter};

/// What the next message from a submitter is expected to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingKind {
    Report,
    Note,
}

/// A parked capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInput {
    pub day: BusinessDay,
    pub kind: PendingKind,
    pub inserted_at: DateTime<Utc>,
}

impl PendingInput {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.inserted_at) > ttl
    }
}

/// One pending input per `(chat, user)`, swept by age
#[derive(Debug)]
pub struct PendingInputs {
    ttl: Duration,
    entries: Mutex<HashMap<Submitter, PendingInput>>,
}

impl PendingInputs {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store with a TTL given in minutes
    pub fn with_ttl_minutes(minutes: u64) -> Self {
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX);
        Self::new(Duration::try_minutes(minutes).unwrap_or(Duration::MAX))
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Submitter, PendingInput>> {
        match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn sweep_locked(entries: &mut HashMap<Submitter, PendingInput>, now: DateTime<Utc>, ttl: Duration) -> usize {
        let before = entries.len();
        entries.retain(|_, input| !input.is_expired(now, ttl));
        before - entries.len()
    }

    /// Park a capture, replacing any earlier one from the same submitter
    pub fn put(
        &self,
        who: Submitter,
        day: BusinessDay,
        kind: PendingKind,
        now: DateTime<Utc>,
    ) -> Option<PendingInput> {
        let mut entries = self.lock();
        Self::sweep_locked(&mut entries, now, self.ttl);
        entries.insert(
            who,
            PendingInput {
                day,
                kind,
                inserted_at: now,
            },
        )
    }

    /// Live pending input for a submitter
    pub fn get(&self, who: Submitter, now: DateTime<Utc>) -> Option<PendingInput> {
        let mut entries = self.lock();
        Self::sweep_locked(&mut entries, now, self.ttl);
        entries.get(&who).copied()
    }

    /// Remove and return the live pending input for a submitter
    pub fn take(&self, who: Submitter, now: DateTime<Utc>) -> Option<PendingInput> {
        let mut entries = self.lock();
        Self::sweep_locked(&mut entries, now, self.ttl);
        entries.remove(&who)
    }

    /// Drop a submitter's pending input regardless of age
    pub fn cancel(&self, who: Submitter) -> bool {
        self.lock().remove(&who).is_some()
    }

    /// Drop expired entries, returning how many were removed
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let removed = Self::sweep_locked(&mut self.lock(), now, self.ttl);
        if removed > 0 {
            tracing::debug!(removed, "Swept expired pending inputs");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PendingInputs {
    fn default() -> Self {
        Self::with_ttl_minutes(30)
    }
}
