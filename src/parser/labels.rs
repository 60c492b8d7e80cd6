//! Label synonym table for shift reports
//!
//! Each canonical label owns an ordered list of variants. A single resolver
//! classifies a line by trying every variant across the whole table, longest
//! first, so `Ventas comida` is read as a lunch heading rather than as the
//! shorter `Ventas` total.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::sanitize::strip_bullet;

/// Canonical report labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Day,
    TotalSales,
    Visa,
    Cash,
    Tips,
    Lunch,
    Dinner,
    Pax,
    WalkIn,
    NoShow,
}

impl Label {
    /// Label as written in the report template
    pub fn canonical(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::TotalSales => "Total Sales Day",
            Self::Visa => "Visa",
            Self::Cash => "Cash",
            Self::Tips => "Tips",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Pax => "Pax",
            Self::WalkIn => "Walk in",
            Self::NoShow => "No show",
        }
    }

    /// Configuration key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::TotalSales => "total_sales",
            Self::Visa => "visa",
            Self::Cash => "cash",
            Self::Tips => "tips",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Pax => "pax",
            Self::WalkIn => "walk_in",
            Self::NoShow => "no_show",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|label| label.key() == key)
    }

    pub fn all() -> [Self; 10] {
        [
            Self::Day,
            Self::TotalSales,
            Self::Visa,
            Self::Cash,
            Self::Tips,
            Self::Lunch,
            Self::Dinner,
            Self::Pax,
            Self::WalkIn,
            Self::NoShow,
        ]
    }

    /// Built-in English and Spanish variants
    fn default_variants(&self) -> &'static [&'static str] {
        match self {
            Self::Day => &["day", "date", "día", "dia", "fecha"],
            Self::TotalSales => &[
                "total sales day",
                "total sales",
                "sales total",
                "total",
                "ventas totales",
                "total ventas",
                "ventas del día",
                "ventas del dia",
                "ventas",
            ],
            Self::Visa => &["visa", "card", "cards", "tarjeta", "tarjetas", "datáfono", "datafono"],
            Self::Cash => &["cash", "efectivo", "metálico", "metalico"],
            Self::Tips => &["tips", "tip", "propinas", "propina"],
            Self::Lunch => &["lunch", "comida", "almuerzo", "ventas comida", "mediodía", "mediodia"],
            Self::Dinner => &["dinner", "cena", "cenas", "ventas cena", "noche"],
            Self::Pax => &["pax", "covers", "cubiertos", "comensales", "personas"],
            Self::WalkIn => &[
                "walk in",
                "walk-in",
                "walkin",
                "walk ins",
                "walk-ins",
                "walkins",
                "sin reserva",
            ],
            Self::NoShow => &[
                "no show",
                "no-show",
                "noshow",
                "no shows",
                "no-shows",
                "noshows",
                "no presentados",
                "no vinieron",
            ],
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

/// A line recognized as `label: value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatch<'a> {
    pub label: Label,
    pub value: &'a str,
}

#[derive(Debug, Clone)]
struct Variant {
    label: Label,
    text: String,
    pattern: Regex,
}

/// Ordered `(canonical label, variants)` table with a first-match resolver
#[derive(Debug, Clone)]
pub struct LabelTable {
    /// All variants, longest first
    variants: Vec<Variant>,
}

impl LabelTable {
    /// Built-in English/Spanish table
    pub fn new() -> Self {
        let mut table = Self {
            variants: Vec::new(),
        };
        for label in Label::all() {
            for variant in label.default_variants() {
                table.push(label, variant);
            }
        }
        table.sort();
        table
    }

    /// Built-in table extended with configured variants keyed by label key
    ///
    /// Unknown keys are logged and skipped.
    pub fn with_extra(extra: &HashMap<String, Vec<String>>) -> Self {
        let mut table = Self::new();
        for (key, variants) in extra {
            let Some(label) = Label::from_key(key) else {
                tracing::warn!(key = %key, "Ignoring synonyms for unknown report label");
                continue;
            };
            for variant in variants {
                table.push(label, variant);
            }
        }
        table.sort();
        table
    }

    fn push(&mut self, label: Label, variant: &str) {
        let text = variant.trim().to_lowercase();
        if text.is_empty() || self.variants.iter().any(|v| v.text == text) {
            return;
        }

        let body = regex::escape(&text).replace(' ', r"\s+");
        let pattern = format!(r"(?i)^{body}(?:\s*[:=\-]\s*|\s+|$)(?P<value>.*)$");
        match Regex::new(&pattern) {
            Ok(pattern) => self.variants.push(Variant {
                label,
                text,
                pattern,
            }),
            Err(e) => tracing::warn!(variant = %variant, error = %e, "Skipping unusable label variant"),
        }
    }

    fn sort(&mut self) {
        self.variants
            .sort_by(|a, b| b.text.chars().count().cmp(&a.text.chars().count()));
    }

    /// Classify one line, returning its label and trimmed value
    pub fn classify<'a>(&self, line: &'a str) -> Option<LabelMatch<'a>> {
        let line = strip_bullet(line.trim());
        self.variants.iter().find_map(|variant| {
            let caps = variant.pattern.captures(line)?;
            let value = caps.name("value").map_or("", |m| m.as_str().trim());
            Some(LabelMatch {
                label: variant.label,
                value,
            })
        })
    }

    /// Rewrite recognized label lines to their canonical template label
    ///
    /// # Examples
    ///
    /// ```
    /// use shiftlog::parser::labels::LabelTable;
    ///
    /// let table = LabelTable::new();
    /// assert_eq!(table.normalize("Efectivo: 799,20\nHola"), "Cash: 799,20\nHola");
    /// ```
    pub fn normalize(&self, text: &str) -> String {
        text.lines()
            .map(|line| match self.classify(line) {
                Some(m) if m.value.is_empty() => format!("{}:", m.label.canonical()),
                Some(m) => format!("{}: {}", m.label.canonical(), m.value),
                None => line.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of variants known
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}
