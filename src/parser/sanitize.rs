//! Text sanitization for chat-submitted reports and notes
//!
//! Messaging clients inject invisible characters, non-breaking spaces and
//! list bullets into pasted text. These helpers strip them so label and
//! heading matching sees plain lines.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

static MULTI_NEWLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Sanitize a submitted text block
///
/// Steps:
/// 1. Normalize line endings to `\n`
/// 2. Remove zero-width characters
/// 3. Replace non-breaking spaces with plain spaces
/// 4. Remove control characters (except newline/tab)
/// 5. Collapse runs of spaces and tabs
/// 6. Trim each line and collapse excessive blank lines
///
/// # Examples
///
/// ```
/// use shiftlog::parser::sanitize::sanitize_text;
///
/// let dirty = "Cash:\u{00A0}799,20\u{200B}\r\n\r\n\r\n\r\nTips: 5";
/// assert_eq!(sanitize_text(dirty), "Cash: 799,20\n\nTips: 5");
/// ```
pub fn sanitize_text(text: &str) -> String {
    let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

    result = remove_zero_width(&result);
    result = replace_nbsp(&result);
    result = remove_control_chars(&result);
    result = WHITESPACE_REGEX.replace_all(&result, " ").into_owned();
    result = trim_lines(&result);
    result = MULTI_NEWLINE_REGEX.replace_all(&result, "\n\n").into_owned();

    result.trim().to_string()
}

/// Remove zero-width spaces, joiners, direction marks and BOM
///
/// # Examples
///
/// ```
/// use shiftlog::parser::sanitize::remove_zero_width;
///
/// assert_eq!(remove_zero_width("Vi\u{200B}sa\u{FEFF}"), "Visa");
/// ```
pub fn remove_zero_width(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(*c,
                '\u{200B}'..='\u{200F}' |
                '\u{2060}' |
                '\u{FEFF}'
            )
        })
        .collect()
}

/// Replace non-breaking and narrow spaces with a plain space
pub fn replace_nbsp(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
            other => other,
        })
        .collect()
}

/// Remove control characters except newline and tab
pub fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Trim whitespace at the start and end of each line
pub fn trim_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

/// Drop leading bullets, dashes and emoji before a label
///
/// # Examples
///
/// ```
/// use shiftlog::parser::sanitize::strip_bullet;
///
/// assert_eq!(strip_bullet("- Pax: 50"), "Pax: 50");
/// assert_eq!(strip_bullet("💳 Visa: 10"), "Visa: 10");
/// ```
pub fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| !c.is_alphanumeric())
}
