//! Synthetic fallback dataset plus the source wrapper that substitutes it
//! when the upstream cannot serve a first page. The pagination engine never
//! learns the substitution happened.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::client::RequestError;
use crate::fetch::PageSource;
use crate::types::{Record, Sentiment};

const HEADLINES: [(&str, Sentiment, bool); 8] = [
    ("Index futures edge higher ahead of the open", Sentiment::Positive, false),
    ("Central bank holds rates, signals patience", Sentiment::Neutral, true),
    ("Chipmaker guides below consensus for Q3", Sentiment::Negative, false),
    ("Energy sector rallies on supply cut reports", Sentiment::Positive, false),
    ("Regulator opens probe into brokerage fees", Sentiment::Negative, true),
    ("Retail sales flat month over month", Sentiment::Neutral, false),
    ("Exporter lands multi-year overseas contract", Sentiment::Positive, false),
    ("Currency slides to a six-month low", Sentiment::Negative, false),
];

/// Deterministic synthetic records with stable `fallback_N` ids.
pub fn fallback_records() -> Vec<Record> {
    let base = Utc::now();
    HEADLINES
        .iter()
        .enumerate()
        .map(|(i, (title, sentiment, important))| Record {
            id: format!("fallback_{}", i + 1),
            title: (*title).to_string(),
            content: format!("{title}. (offline placeholder)"),
            publish_time: Some(base - Duration::minutes(i as i64)),
            tags: vec!["fallback".to_string()],
            entities: vec![],
            sentiment: *sentiment,
            important: *important,
        })
        .collect()
}

/// Slice of the fallback dataset for a given page window.
pub fn fallback_page(offset: usize, limit: usize) -> Vec<Record> {
    fallback_records()
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect()
}

/// Delegates to the primary source; while no real page has ever been served,
/// a failed or empty first page yields the synthetic dataset instead. Once
/// real records have been seen, failures propagate so the caller keeps the
/// records it already holds instead of having them swapped for placeholders.
/// Load-more failures always propagate so the engine can stop scrolling.
pub struct WithFallback<S> {
    primary: S,
    served_real: AtomicBool,
}

impl<S> WithFallback<S> {
    pub fn new(primary: S) -> Self {
        Self {
            primary,
            served_real: AtomicBool::new(false),
        }
    }

    fn substitutes(&self, offset: usize) -> bool {
        offset == 0 && !self.served_real.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<S: PageSource> PageSource for WithFallback<S> {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>, RequestError> {
        match self.primary.fetch_page(offset, limit).await {
            Ok(records) if !records.is_empty() => {
                self.served_real.store(true, Ordering::Relaxed);
                Ok(records)
            }
            Ok(records) => {
                if self.substitutes(offset) {
                    tracing::warn!(target: "fallback", "upstream returned an empty first page, serving synthetic records");
                    Ok(fallback_page(0, limit))
                } else {
                    Ok(records)
                }
            }
            Err(e) => {
                if self.substitutes(offset) {
                    tracing::warn!(target: "fallback", error = %e, "upstream unreachable, serving synthetic records");
                    Ok(fallback_page(0, limit))
                } else {
                    Err(e)
                }
            }
        }
    }
}
