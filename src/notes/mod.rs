//! Notes section extraction
//!
//! Splits free-form shift notes into the four canonical sections. Headings
//! are recognized from a multi-language synonym table compiled into a single
//! pattern, longest variants first, so `problemas de personal:` is read as a
//! staff heading instead of being cut short at `problemas`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::parser::sanitize::{sanitize_text, strip_bullet};

/// Canonical note sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Incidents,
    Staff,
    SoldOut,
    Complaints,
}

impl Section {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Incidents => "incidents",
            Self::Staff => "staff",
            Self::SoldOut => "soldout",
            Self::Complaints => "complaints",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.key() == key)
    }

    pub fn all() -> [Self; 4] {
        [Self::Incidents, Self::Staff, Self::SoldOut, Self::Complaints]
    }

    fn default_headings(&self) -> &'static [&'static str] {
        match self {
            Self::Incidents => &[
                "incidents",
                "incident",
                "incidencias",
                "incidencia",
                "incidentes",
                "issues",
                "problems",
                "problemas",
                "maintenance",
                "mantenimiento",
                "averías",
                "averias",
            ],
            Self::Staff => &[
                "staff",
                "staff issues",
                "staff notes",
                "personal",
                "problemas de personal",
                "equipo",
                "team",
                "plantilla",
                "empleados",
            ],
            Self::SoldOut => &[
                "sold out",
                "sold-out",
                "soldout",
                "86",
                "agotado",
                "agotados",
                "productos agotados",
                "sin stock",
                "out of stock",
                "roturas de stock",
            ],
            Self::Complaints => &[
                "complaints",
                "complaint",
                "customer complaints",
                "quejas",
                "queja",
                "quejas de clientes",
                "reclamaciones",
                "reclamación",
                "reclamacion",
            ],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Section texts for one note; every section is present, possibly empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMap(BTreeMap<Section, String>);

impl SectionMap {
    fn empty() -> Self {
        Self(Section::all().into_iter().map(|s| (s, String::new())).collect())
    }

    fn append(&mut self, section: Section, body: &str) {
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        let slot = self.0.entry(section).or_default();
        if !slot.is_empty() {
            slot.push('\n');
        }
        slot.push_str(body);
    }

    /// Text of one section, empty when absent
    pub fn get(&self, section: Section) -> &str {
        self.0.get(&section).map_or("", String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.0.iter().map(|(s, text)| (*s, text.as_str()))
    }

    /// True when every section is empty
    pub fn is_empty(&self) -> bool {
        self.0.values().all(String::is_empty)
    }
}

/// Heading-driven notes splitter
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    /// `(normalized heading, section)`, longest heading first
    table: Vec<(String, Section)>,
    pattern: Regex,
}

impl SectionExtractor {
    /// Extractor with the built-in English/Spanish headings
    pub fn new() -> Self {
        Self::with_extra(&HashMap::new())
    }

    /// Built-in headings plus configured ones keyed by section key
    pub fn with_extra(extra: &HashMap<String, Vec<String>>) -> Self {
        let mut table: Vec<(String, Section)> = Vec::new();
        let mut add = |heading: &str, section: Section| {
            let heading = normalize_heading(heading);
            if !heading.is_empty() && !table.iter().any(|(h, _)| *h == heading) {
                table.push((heading, section));
            }
        };

        for section in Section::all() {
            for heading in section.default_headings() {
                add(heading, section);
            }
        }
        for (key, headings) in extra {
            let Some(section) = Section::from_key(key) else {
                tracing::warn!(key = %key, "Ignoring headings for unknown note section");
                continue;
            };
            for heading in headings {
                add(heading, section);
            }
        }

        table.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        let alternation = table
            .iter()
            .map(|(heading, _)| regex::escape(heading).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)^(?P<heading>{alternation})[*_]*\s*:[*_\s]*$"))
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Heading pattern failed to compile; headings disabled");
                Regex::new(r"[^\s\S]").unwrap()
            });

        Self { table, pattern }
    }

    /// Section a heading line introduces, if it is one
    pub fn heading(&self, line: &str) -> Option<Section> {
        let line = strip_bullet(line.trim());
        let caps = self.pattern.captures(line)?;
        self.canonical_for(&caps["heading"])
    }

    /// Map a heading string to its section: exact match, then containment
    pub fn canonical_for(&self, heading: &str) -> Option<Section> {
        let heading = normalize_heading(heading);
        if heading.is_empty() {
            return None;
        }

        self.table
            .iter()
            .find(|(known, _)| *known == heading)
            .or_else(|| self.table.iter().find(|(known, _)| heading.contains(known.as_str())))
            .or_else(|| self.table.iter().find(|(known, _)| known.contains(heading.as_str())))
            .map(|(_, section)| *section)
    }

    /// Split note text into sections
    ///
    /// Text before the first heading, or the whole text when no heading is
    /// present, is attributed to [`Section::Incidents`]. Repeated headings
    /// have their bodies joined with a newline.
    pub fn extract(&self, text: &str) -> SectionMap {
        let clean = sanitize_text(text);
        let mut sections = SectionMap::empty();
        let mut current = Section::Incidents;
        let mut body: Vec<&str> = Vec::new();

        for line in clean.lines() {
            if let Some(section) = self.heading(line) {
                sections.append(current, &body.join("\n"));
                body.clear();
                current = section;
            } else {
                body.push(line);
            }
        }
        sections.append(current, &body.join("\n"));

        sections
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Split with the built-in heading table
pub fn extract_sections(text: &str) -> SectionMap {
    SectionExtractor::new().extract(text)
}

fn normalize_heading(heading: &str) -> String {
    heading
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
