//! Locale-tolerant numeric and date literals
//!
//! Decimal rule, applied after stripping currency symbols and whitespace:
//!
//! | `.` present | `,` present | interpretation                          |
//! |-------------|-------------|-----------------------------------------|
//! | yes         | yes         | `.` groups thousands, `,` is the decimal |
//! | no          | yes         | `,` is the decimal                       |
//! | any         | no          | parsed as written                        |
//!
//! So `1.234,50` and `1234,50` both read as 1234.5, while `1234.50` stays
//! as written. A lone `,` is never read as a thousands separator.

use chrono::NaiveDate;

use super::error::{ParseError, ParseResult};

const CURRENCY_SYMBOLS: &[char] = &['€', '$', '£', '¥', '₩', '₹'];

/// Parse a decimal amount such as `€ 7.199,50`
///
/// Returns `None` for anything that is not a finite number once the
/// decimal rule is applied.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();

    if cleaned.is_empty()
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
    {
        return None;
    }

    let normalized = match (cleaned.contains('.'), cleaned.contains(',')) {
        (true, true) => cleaned.replace('.', "").replace(',', "."),
        (false, true) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative head count such as `50`
pub fn parse_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Parse a report day in `YYYY-MM-DD` or `DD/MM/YYYY` form
///
/// Only the first whitespace-separated token is read, so trailing
/// weekday names are tolerated.
pub fn parse_date(raw: &str) -> ParseResult<NaiveDate> {
    let token = raw.split_whitespace().next().unwrap_or_default();

    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(token, "%d/%m/%Y"))
        .map_err(|_| ParseError::InvalidDateFormat(raw.trim().to_string()))
}
