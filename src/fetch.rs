//! Page fetcher: one offset/limit call against the feed endpoint, mapped to
//! normalized records. Retry/backoff lives entirely in [`RequestClient`];
//! errors propagate verbatim.

use async_trait::async_trait;
use metrics::counter;

use crate::client::{RequestClient, RequestError};
use crate::normalize::{normalize_item, RawFlash};
use crate::types::Record;

/// Anything the pagination engine can pull pages from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>, RequestError>;
}

pub struct FlashFetcher {
    client: RequestClient,
    path: String,
    extra: Vec<(String, String)>,
}

impl FlashFetcher {
    pub fn new(client: RequestClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            extra: Vec::new(),
        }
    }

    /// Add a fixed query parameter sent with every page (e.g. a sentiment
    /// filter understood by the upstream).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl PageSource for FlashFetcher {
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Record>, RequestError> {
        let mut query = vec![
            ("skip".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        query.extend(self.extra.iter().cloned());

        let body = self.client.get_json(&self.path, &query).await?;
        let raw: Vec<RawFlash> =
            serde_json::from_value(body).map_err(|e| RequestError::Parse(e.to_string()))?;

        let raw_len = raw.len();
        let records: Vec<Record> = raw.into_iter().filter_map(normalize_item).collect();

        counter!("feed_pages_fetched_total").increment(1);
        counter!("feed_records_normalized_total").increment(records.len() as u64);
        if records.len() < raw_len {
            tracing::warn!(
                target: "fetch",
                dropped = raw_len - records.len(),
                "upstream items without id dropped"
            );
        }
        tracing::debug!(target: "fetch", offset, limit, count = records.len(), "page fetched");

        Ok(records)
    }
}
