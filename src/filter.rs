//! Display filter over the cumulative feed: sentiment equality, importance
//! flag, and a substring search across title/content/tags. Debouncing of the
//! search input is a presentation concern and lives with the UI.

use crate::types::{Record, Sentiment};

#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    pub sentiment: Option<Sentiment>,
    pub important_only: bool,
    pub query: Option<String>,
}

impl FeedFilter {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(s) = self.sentiment {
            if record.sentiment != s {
                return false;
            }
        }
        if self.important_only && !record.important {
            return false;
        }
        if let Some(q) = &self.query {
            let q = q.trim().to_lowercase();
            if !q.is_empty() && !matches_query(record, &q) {
                return false;
            }
        }
        true
    }

    /// Borrowing projection of the displayed subset, in feed order.
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn matches_query(record: &Record, lowered: &str) -> bool {
    record.title.to_lowercase().contains(lowered)
        || record.content.to_lowercase().contains(lowered)
        || record.tags.iter().any(|t| t.to_lowercase().contains(lowered))
}
