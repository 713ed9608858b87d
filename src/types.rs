//! Core feed types shared across the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment of a flash, derived once at normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// A security mentioned by a flash (e.g. `{market: "sz", symbol: "SZ002651", name: "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedEntity {
    pub name: String,
    pub symbol: String,
    pub market: String,
}

/// A normalized unit of feed content. `id` is the sole dedup key; `sentiment`
/// and `important` are derived once during normalization and never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub content: String,
    pub publish_time: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub entities: Vec<AssociatedEntity>,
    pub sentiment: Sentiment,
    pub important: bool,
}
