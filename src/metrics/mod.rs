//! Prometheus metrics for report ingestion and trend analysis
//!
//! This module provides metrics tracking for:
//! - Reports parsed, by outcome (accepted or the rejecting error kind)
//! - Notes stored or ignored as duplicates
//! - Spikes flagged per section
//! - Translation annotations (cache hits, fresh translations, fallbacks)
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

struct ShiftlogMetrics {
    reports: CounterVec,
    notes: CounterVec,
    spikes: CounterVec,
    translations: CounterVec,
    parse_duration: HistogramVec,
}

static METRICS: OnceLock<ShiftlogMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// This function should be called once at application startup.
/// If metric registration fails, subsequent metric operations become
/// no-ops.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = shiftlog::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = ShiftlogMetrics {
        reports: register_counter_vec!(
            "shiftlog_reports_parsed_total",
            "Shift reports parsed, by outcome",
            &["outcome"]
        )?,
        notes: register_counter_vec!(
            "shiftlog_notes_total",
            "Shift notes received, by outcome",
            &["outcome"]
        )?,
        spikes: register_counter_vec!(
            "shiftlog_spikes_flagged_total",
            "Phrases flagged as spikes, by note section",
            &["section"]
        )?,
        translations: register_counter_vec!(
            "shiftlog_translations_total",
            "Phrase annotations, by outcome",
            &["outcome"]
        )?,
        parse_duration: register_histogram_vec!(
            "shiftlog_parse_duration_seconds",
            "Time spent parsing submitted text",
            &["kind"],
            vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
        )?,
    };

    METRICS
        .set(metrics)
        .map_err(|_| "Shiftlog metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record a report parse outcome (`accepted` or an error kind)
pub fn record_report_parsed(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.reports.with_label_values(&[outcome]).inc();
    }
}

/// Record a note submission (`stored` or `duplicate`)
pub fn record_note(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.notes.with_label_values(&[outcome]).inc();
    }
}

/// Record spikes flagged for a section
pub fn record_spikes(section: &str, count: usize) {
    let Some(m) = METRICS.get() else {
        return;
    };
    if count > 0 {
        m.spikes.with_label_values(&[section]).inc_by(count as f64);
    }
}

/// Record a translation outcome (`cache_hit`, `translated`, `fallback`)
pub fn record_translation(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.translations.with_label_values(&[outcome]).inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start a parse timer for `report` or `note` text
pub fn start_parse_timer(kind: &str) -> MetricsTimer {
    match METRICS.get() {
        Some(m) => MetricsTimer::new(m.parse_duration.with_label_values(&[kind]).start_timer()),
        None => MetricsTimer::noop(),
    }
}
