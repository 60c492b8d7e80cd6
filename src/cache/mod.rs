//! In-process translation cache
//!
//! Maps a source phrase to its annotated form for the lifetime of the
//! process. Entries are never invalidated; a phrase is translated at most
//! once per run.
//!
//! # Example
//!
//! ```
//! use shiftlog::cache::TranslationCache;
//!
//! let cache = TranslationCache::new();
//! cache.put("música alta", "música alta (loud music)");
//! assert_eq!(cache.get("música alta").as_deref(), Some("música alta (loud music)"));
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe `phrase -> annotated phrase` store
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RwLock<HashMap<String, String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached annotation for a phrase
    pub fn get(&self, phrase: &str) -> Option<String> {
        match self.entries.read() {
            Ok(entries) => entries.get(phrase).cloned(),
            Err(poisoned) => poisoned.into_inner().get(phrase).cloned(),
        }
    }

    /// Store an annotation; the first stored value for a phrase is kept
    ///
    /// # Returns
    ///
    /// `true` when the phrase was not cached before
    pub fn put(&self, phrase: impl Into<String>, annotated: impl Into<String>) -> bool {
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        let phrase = phrase.into();
        if entries.contains_key(&phrase) {
            return false;
        }
        entries.insert(phrase, annotated.into());
        true
    }

    /// Expiry hook shared with the other session stores; nothing expires here
    pub fn sweep(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
