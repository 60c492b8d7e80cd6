// Core data structures for shift reports and notes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Operational date a report or note is attributed to
pub type BusinessDay = NaiveDate;

/// Service sub-block of a daily report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Lunch,
    Dinner,
}

impl Service {
    /// Heading used in the report template
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::Lunch, Self::Dinner]
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Figures for one service (lunch or dinner)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceFigures {
    pub sales: f64,
    pub pax: u32,
    pub walkins: u32,
    pub noshows: u32,
}

/// One business day's sales report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub day: BusinessDay,
    pub total_sales: f64,
    pub visa: f64,
    pub cash: f64,
    pub tips: f64,
    pub lunch: ServiceFigures,
    pub dinner: ServiceFigures,
}

impl DailyRecord {
    /// Guests served across both services
    ///
    /// Summed in `u64`: each service count is an independent `u32`.
    pub fn covers(&self) -> u64 {
        u64::from(self.lunch.pax) + u64::from(self.dinner.pax)
    }

    pub fn walkins(&self) -> u64 {
        u64::from(self.lunch.walkins) + u64::from(self.dinner.walkins)
    }

    pub fn noshows(&self) -> u64 {
        u64::from(self.lunch.noshows) + u64::from(self.dinner.noshows)
    }

    /// Average spend per cover, zero when nobody was served
    pub fn avg_ticket(&self) -> f64 {
        avg_ticket(self.total_sales, self.covers())
    }

    /// Flat field view, in template order
    pub fn fields(&self) -> [(&'static str, f64); 12] {
        [
            ("total_sales", self.total_sales),
            ("visa", self.visa),
            ("cash", self.cash),
            ("tips", self.tips),
            ("lunch_sales", self.lunch.sales),
            ("lunch_pax", f64::from(self.lunch.pax)),
            ("lunch_walkins", f64::from(self.lunch.walkins)),
            ("lunch_noshows", f64::from(self.lunch.noshows)),
            ("dinner_sales", self.dinner.sales),
            ("dinner_pax", f64::from(self.dinner.pax)),
            ("dinner_walkins", f64::from(self.dinner.walkins)),
            ("dinner_noshows", f64::from(self.dinner.noshows)),
        ]
    }
}

/// Sum of daily records over a period
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesAggregate {
    pub days_reported: u32,
    pub total_sales: f64,
    pub visa: f64,
    pub cash: f64,
    pub tips: f64,
    pub lunch_sales: f64,
    pub dinner_sales: f64,
    pub covers: u64,
    pub walkins: u64,
    pub noshows: u64,
}

impl SalesAggregate {
    /// Fold one record into the running total
    pub fn add(&mut self, record: &DailyRecord) {
        self.days_reported += 1;
        self.total_sales += record.total_sales;
        self.visa += record.visa;
        self.cash += record.cash;
        self.tips += record.tips;
        self.lunch_sales += record.lunch.sales;
        self.dinner_sales += record.dinner.sales;
        self.covers = self.covers.saturating_add(record.covers());
        self.walkins = self.walkins.saturating_add(record.walkins());
        self.noshows = self.noshows.saturating_add(record.noshows());
    }

    pub fn avg_ticket(&self) -> f64 {
        avg_ticket(self.total_sales, self.covers)
    }

    /// Average sales per reported day
    pub fn avg_daily_sales(&self) -> f64 {
        if self.days_reported == 0 {
            0.0
        } else {
            self.total_sales / f64::from(self.days_reported)
        }
    }
}

impl<'a> FromIterator<&'a DailyRecord> for SalesAggregate {
    fn from_iter<I: IntoIterator<Item = &'a DailyRecord>>(iter: I) -> Self {
        let mut aggregate = Self::default();
        for record in iter {
            aggregate.add(record);
        }
        aggregate
    }
}

fn avg_ticket(sales: f64, covers: u64) -> f64 {
    if covers == 0 {
        0.0
    } else {
        sales / covers as f64
    }
}

/// Who sent a message: conversation plus user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Submitter {
    pub chat_id: i64,
    pub user_id: i64,
}

impl Submitter {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

/// Free-form operational note as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub day: BusinessDay,
    pub source_chat: i64,
    pub source_user: i64,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}

impl NoteEntry {
    pub fn new(day: BusinessDay, submitter: Submitter, raw_text: impl Into<String>) -> Self {
        Self {
            day,
            source_chat: submitter.chat_id,
            source_user: submitter.user_id,
            raw_text: raw_text.into(),
            created_at: Utc::now(),
        }
    }

    /// SHA256 over day, source and text; identical re-deliveries collide
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.day.to_string().as_bytes());
        hasher.update(self.source_chat.to_le_bytes());
        hasher.update(self.source_user.to_le_bytes());
        hasher.update(self.raw_text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
