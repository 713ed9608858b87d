//! # Pagination & Deduplication Engine
//! Owns the cumulative ordered feed. Refresh replaces the collection, load
//! more appends only unseen ids; both are the same `apply_fetch` transition
//! with a different mode. Insertion order is never rewritten.

use std::collections::HashSet;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::client::RequestError;
use crate::fetch::PageSource;
use crate::types::Record;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_pages_fetched_total", "Pages fetched from the upstream.");
        describe_counter!(
            "feed_records_normalized_total",
            "Records kept after normalization."
        );
        describe_counter!("feed_records_kept_total", "Records merged into the feed.");
        describe_counter!(
            "feed_dedup_total",
            "Fetched records dropped because their id was already present."
        );
    });
}

/// How a fetched page is merged into the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Refresh: the collection is rebuilt from the page.
    Replace,
    /// Infinite scroll: unseen records are appended after the existing ones.
    Append,
}

/// Cumulative feed state. Mutated only by [`FeedEngine`].
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    /// Insertion-ordered records with unique ids.
    pub records: Vec<Record>,
    /// Offset for the next load-more call.
    pub next_offset: usize,
    /// True once the upstream has nothing further to offer.
    pub exhausted: bool,
}

pub struct FeedEngine<S> {
    source: S,
    page_size: usize,
    state: FeedState,
}

impl<S: PageSource> FeedEngine<S> {
    pub fn new(source: S, page_size: usize) -> Self {
        ensure_metrics_described();
        Self {
            source,
            page_size: page_size.max(1),
            state: FeedState::default(),
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn records(&self) -> &[Record] {
        &self.state.records
    }

    /// Fetch page 0 and rebuild the feed from it. On failure the state is
    /// left untouched and the error surfaces to the caller.
    pub async fn load_first_page(&mut self) -> Result<usize, RequestError> {
        let fetched = self.source.fetch_page(0, self.page_size).await?;
        Ok(self.apply_fetch(ApplyMode::Replace, fetched))
    }

    /// Fetch the next page and append its unseen records. No-op once
    /// exhausted. A failed fetch leaves the records untouched but marks the
    /// feed exhausted so automatic scrolling stops; a later
    /// `load_first_page` recovers.
    pub async fn load_more(&mut self) -> Result<usize, RequestError> {
        if self.state.exhausted {
            tracing::debug!(target: "engine", "load_more skipped: exhausted");
            return Ok(0);
        }
        match self
            .source
            .fetch_page(self.state.next_offset, self.page_size)
            .await
        {
            Ok(fetched) => Ok(self.apply_fetch(ApplyMode::Append, fetched)),
            Err(e) => {
                self.state.exhausted = true;
                Err(e)
            }
        }
    }

    /// Merge a fetched page into the state. Returns the number of records
    /// actually added.
    fn apply_fetch(&mut self, mode: ApplyMode, fetched: Vec<Record>) -> usize {
        let fetched_len = fetched.len();
        let added = match mode {
            ApplyMode::Replace => {
                // A page may repeat an id; the first occurrence wins.
                let mut seen: HashSet<String> = HashSet::with_capacity(fetched_len);
                let mut records = Vec::with_capacity(fetched_len);
                for rec in fetched {
                    if seen.insert(rec.id.clone()) {
                        records.push(rec);
                    } else {
                        counter!("feed_dedup_total").increment(1);
                    }
                }
                let added = records.len();
                self.state.records = records;
                self.state.next_offset = self.page_size;
                self.state.exhausted = fetched_len < self.page_size;
                added
            }
            ApplyMode::Append => {
                let existing: HashSet<&str> =
                    self.state.records.iter().map(|r| r.id.as_str()).collect();
                let fresh: Vec<Record> = fetched
                    .into_iter()
                    .filter(|r| !existing.contains(r.id.as_str()))
                    .collect();
                counter!("feed_dedup_total").increment((fetched_len - fresh.len()) as u64);

                if fresh.is_empty() {
                    // Upstream only repeats what we already hold.
                    self.state.exhausted = true;
                    return 0;
                }
                let added = fresh.len();
                self.state.records.extend(fresh);
                self.state.next_offset += self.page_size;
                self.state.exhausted = fetched_len < self.page_size;
                added
            }
        };

        counter!("feed_records_kept_total").increment(added as u64);
        tracing::info!(
            target: "engine",
            ?mode,
            added,
            total = self.state.records.len(),
            next_offset = self.state.next_offset,
            exhausted = self.state.exhausted,
            "page merged"
        );
        added
    }
}
