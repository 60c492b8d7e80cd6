//! Internationalization (i18n) support
//!
//! Staff write in English or Spanish, so user-facing messages (CLI output,
//! rejection reasons) are available in both. Supported languages:
//! English (en), Spanish (es).
//!
//! # Environment Variables
//!
//! - `SHIFTLOG_LANG`: Set the preferred language (en, es). Defaults to English.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shiftlog::i18n::{t, set_locale};
//!
//! set_locale("es");
//! let msg = t!("cli.ingest.stored", day = "2026-01-05");
//! ```

use std::sync::RwLock;

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

static CURRENT_LOCALE: RwLock<String> = RwLock::new(String::new());

/// Set the current locale for translations
///
/// Unknown locales fall back to English.
pub fn set_locale(locale: &str) {
    let normalized = normalize_locale(locale);
    rust_i18n::set_locale(normalized);
    match CURRENT_LOCALE.write() {
        Ok(mut current) => *current = normalized.to_string(),
        Err(poisoned) => *poisoned.into_inner() = normalized.to_string(),
    }
}

/// Get the current locale
///
/// Returns the currently active locale or the default fallback.
pub fn current_locale() -> String {
    let current = match CURRENT_LOCALE.read() {
        Ok(current) => current.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    if current.is_empty() {
        "en".to_string()
    } else {
        current
    }
}

/// Initialize i18n from `SHIFTLOG_LANG`
pub fn init_from_env() {
    let locale = std::env::var("SHIFTLOG_LANG").unwrap_or_else(|_| "en".to_string());
    set_locale(&locale);
}

/// Normalize locale code to supported format
///
/// - es-ES, es_MX, spanish, español -> es
/// - anything else -> en
fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("es") || lower == "spanish" || lower == "español" {
        "es"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// This is a re-export of rust_i18n::t! for convenience.
///
/// ```rust,ignore
/// use shiftlog::i18n::t;
///
/// let msg = t!("errors.category.parsing");
/// let msg_with_args = t!("errors.parse.missing_field", field = "total_sales");
/// ```
#[doc(inline)]
pub use rust_i18n::t;
