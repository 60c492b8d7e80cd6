//! Best-effort phrase annotation
//!
//! Ranked phrases are decorated with a translation at formatting time
//! (`música alta (loud music)`). The network call is bounded by a timeout and
//! any failure falls back to the untouched phrase; annotation never fails
//! the caller. A phrase that failed once is not retried for the life of the
//! annotator, and a batch is translated concurrently so it waits at most one
//! timeout.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::cache::TranslationCache;
use crate::config::TranslationConfig;

/// Translates one phrase
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, phrase: &str) -> Result<String>;
}

/// Returns every phrase unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, phrase: &str) -> Result<String> {
        Ok(phrase.to_string())
    }
}

/// LibreTranslate request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// LibreTranslate response body
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-compatible `/translate` endpoint
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    target_lang: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            target_lang: config.target_lang.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, phrase: &str) -> Result<String> {
        let request = TranslateRequest {
            q: phrase,
            source: "auto",
            target: &self.target_lang,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to send translation request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Translation request failed: {} - {}", status, body);
        }

        let body: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse translation response")?;

        Ok(body.translated_text)
    }
}

/// `phrase (translation)`, or the phrase alone when nothing was learned
pub fn format_annotation(phrase: &str, translation: &str) -> String {
    let translation = translation.trim();
    if translation.is_empty() || translation.eq_ignore_ascii_case(phrase.trim()) {
        phrase.to_string()
    } else {
        format!("{phrase} ({translation})")
    }
}

/// Translator wrapped with the process cache and a timeout
#[derive(Clone)]
pub struct Annotator {
    translator: Arc<dyn Translator>,
    cache: Arc<TranslationCache>,
    failed: Arc<RwLock<HashSet<String>>>,
    timeout: Duration,
}

impl Annotator {
    pub fn new(translator: Arc<dyn Translator>, cache: Arc<TranslationCache>, timeout: Duration) -> Self {
        Self {
            translator,
            cache,
            failed: Arc::default(),
            timeout,
        }
    }

    /// HTTP annotator when enabled, pass-through otherwise
    pub fn from_config(config: &TranslationConfig, cache: Arc<TranslationCache>) -> Result<Self> {
        let translator: Arc<dyn Translator> = if config.enabled {
            Arc::new(HttpTranslator::new(config)?)
        } else {
            Arc::new(PassthroughTranslator)
        };
        Ok(Self::new(
            translator,
            cache,
            Duration::from_millis(config.timeout_ms),
        ))
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    fn has_failed(&self, phrase: &str) -> bool {
        self.failed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(phrase)
    }

    fn mark_failed(&self, phrase: &str) {
        self.failed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(phrase.to_string());
    }

    /// Annotate one phrase; never fails
    pub async fn annotate(&self, phrase: &str) -> String {
        if let Some(hit) = self.cache.get(phrase) {
            crate::metrics::record_translation("cache_hit");
            return hit;
        }
        if self.has_failed(phrase) {
            crate::metrics::record_translation("fallback");
            return phrase.to_string();
        }

        match tokio::time::timeout(self.timeout, self.translator.translate(phrase)).await {
            Ok(Ok(translation)) => {
                let annotated = format_annotation(phrase, &translation);
                self.cache.put(phrase, annotated.clone());
                crate::metrics::record_translation("translated");
                annotated
            }
            Ok(Err(e)) => {
                tracing::warn!(phrase = %phrase, error = %e, "Translation failed; using original phrase");
                self.mark_failed(phrase);
                crate::metrics::record_translation("fallback");
                phrase.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    phrase = %phrase,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Translation timed out; using original phrase"
                );
                self.mark_failed(phrase);
                crate::metrics::record_translation("fallback");
                phrase.to_string()
            }
        }
    }

    /// Annotate phrases in order
    ///
    /// Distinct phrases are translated once each and concurrently, so the
    /// whole batch waits at most one timeout.
    pub async fn annotate_all<I, S>(&self, phrases: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<S> = phrases.into_iter().collect();

        let mut seen = HashSet::new();
        let distinct: Vec<&str> = phrases
            .iter()
            .map(|phrase| phrase.as_ref())
            .filter(|phrase| seen.insert(*phrase))
            .collect();

        let annotated = join_all(distinct.iter().map(|phrase| self.annotate(phrase))).await;
        let lookup: HashMap<&str, String> = distinct.into_iter().zip(annotated).collect();

        phrases
            .iter()
            .map(|phrase| {
                let phrase = phrase.as_ref();
                lookup
                    .get(phrase)
                    .cloned()
                    .unwrap_or_else(|| phrase.to_string())
            })
            .collect()
    }
}
