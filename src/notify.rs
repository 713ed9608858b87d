//! Notification decisions and the sinks that consume them.
//!
//! The detector only classifies; whether a decision actually alerts the user
//! is decided here by [`AlertPolicy`] (user preferences) before it is handed
//! to the configured sinks.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::types::Sentiment;

/// Classified outcome of a refresh delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationDecision {
    /// Number of newly-seen records.
    pub count: usize,
    /// Any delta record flagged important or carrying the focus tag.
    pub has_important: bool,
    /// Sentiment of the most recent delta record.
    pub dominant_sentiment: Sentiment,
}

/// User alerting preferences.
#[derive(Debug, Clone, Default)]
pub struct AlertPolicy {
    /// Only alert when the dominant sentiment matches.
    pub sentiment_filter: Option<Sentiment>,
    /// Only alert when the delta contains an important record.
    pub important_only: bool,
}

impl AlertPolicy {
    pub fn should_alert(&self, decision: &NotificationDecision) -> bool {
        if self.important_only && !decision.has_important {
            return false;
        }
        if let Some(wanted) = self.sentiment_filter {
            if decision.dominant_sentiment != wanted {
                return false;
            }
        }
        true
    }
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, decision: &NotificationDecision) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Structured-log sink; always available.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, decision: &NotificationDecision) -> Result<()> {
        tracing::info!(
            target: "notify",
            count = decision.count,
            has_important = decision.has_important,
            sentiment = decision.dominant_sentiment.as_str(),
            "feed alert"
        );
        Ok(())
    }
    fn name(&self) -> &'static str {
        "log"
    }
}

/// POSTs the decision as JSON to a webhook, if one is configured.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var("FLASH_FEED_WEBHOOK_URL").ok().map(Self::new)
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, decision: &NotificationDecision) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .timeout(std::time::Duration::from_secs(5))
            .json(decision)
            .send()
            .await
            .context("webhook send")?;
        resp.error_for_status().context("webhook status")?;
        Ok(())
    }
    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Fan-out over all configured sinks. Sink failures are logged, never fatal.
pub struct NotifierMux {
    sinks: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(sinks: Vec<Box<dyn Notifier>>) -> Self {
        Self { sinks }
    }

    /// Log sink plus webhook when `FLASH_FEED_WEBHOOK_URL` is set.
    pub fn from_env() -> Self {
        let mut sinks: Vec<Box<dyn Notifier>> = vec![Box::new(LogNotifier)];
        if let Some(webhook) = WebhookNotifier::from_env() {
            sinks.push(Box::new(webhook));
        }
        Self { sinks }
    }

    pub async fn notify(&self, decision: &NotificationDecision) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(decision).await {
                tracing::warn!(target: "notify", sink = sink.name(), error = %format!("{e:#}"), "sink failed");
            }
        }
    }
}
