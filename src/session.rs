//! Feed session: ties fetcher, engine, detector and notification sinks into
//! one periodically refreshed unit. All engine access goes through a single
//! async mutex; a refresh or load-more arriving while another call holds it
//! is dropped, not queued, so merges never race and timer ticks cannot pile
//! up behind a slow upstream.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::detector::ChangeDetector;
use crate::engine::{FeedEngine, FeedState};
use crate::fetch::PageSource;
use crate::notify::{AlertPolicy, NotificationDecision, NotifierMux};
use crate::types::Record;

#[derive(Debug)]
pub enum RefreshOutcome {
    Completed {
        added: usize,
        decision: Option<NotificationDecision>,
    },
    /// Another engine call was in flight; this invocation was dropped.
    Skipped,
}

struct SessionInner<S> {
    engine: FeedEngine<S>,
    detector: ChangeDetector,
}

pub struct FeedSession<S> {
    inner: Arc<Mutex<SessionInner<S>>>,
    policy: AlertPolicy,
    notifiers: NotifierMux,
    refresh_interval: Duration,
}

impl<S: PageSource> FeedSession<S> {
    pub fn new(
        source: S,
        page_size: usize,
        refresh_interval: Duration,
        policy: AlertPolicy,
        notifiers: NotifierMux,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                engine: FeedEngine::new(source, page_size),
                detector: ChangeDetector::new(),
            })),
            policy,
            notifiers,
            refresh_interval,
        }
    }

    /// Full refresh: reload page 0, evaluate the delta, alert if the policy
    /// allows. Errors are surfaced, previously loaded records stay intact.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let Ok(mut guard) = self.inner.try_lock() else {
            tracing::debug!(target: "session", "refresh dropped: previous call still in flight");
            return Ok(RefreshOutcome::Skipped);
        };
        let inner = &mut *guard;

        let added = inner.engine.load_first_page().await.context("refresh")?;
        let decision = inner.detector.on_refresh_complete(inner.engine.records());

        if let Some(d) = &decision {
            if self.policy.should_alert(d) {
                self.notifiers.notify(d).await;
            } else {
                tracing::debug!(target: "session", "alert suppressed by policy");
            }
        }

        Ok(RefreshOutcome::Completed { added, decision })
    }

    /// Pull the next page. Newly appended ids are tracked so the next
    /// refresh does not re-notify for them.
    pub async fn load_more(&self) -> Result<usize> {
        let Ok(mut guard) = self.inner.try_lock() else {
            tracing::debug!(target: "session", "load_more dropped: previous call still in flight");
            return Ok(0);
        };
        let inner = &mut *guard;

        let added = inner.engine.load_more().await.context("load more")?;
        if added > 0 {
            let records = inner.engine.records();
            inner.detector.track(&records[records.len() - added..]);
        }
        Ok(added)
    }

    pub async fn state(&self) -> FeedState {
        self.inner.lock().await.engine.state().clone()
    }

    pub async fn records(&self) -> Vec<Record> {
        self.inner.lock().await.engine.records().to_vec()
    }

    /// Periodic refresh loop. Failed ticks are logged and the loop keeps
    /// going; the session never dies because the upstream is down.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.refresh_interval);
        loop {
            ticker.tick().await;
            match self.refresh().await {
                Ok(RefreshOutcome::Completed { added, .. }) => {
                    tracing::debug!(target: "session", added, "refresh tick done");
                }
                Ok(RefreshOutcome::Skipped) => {}
                Err(e) => {
                    tracing::warn!(target: "session", error = %format!("{e:#}"), "refresh tick failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestError;
    use crate::types::Sentiment;
    use async_trait::async_trait;

    struct SlowSource;

    #[async_trait]
    impl PageSource for SlowSource {
        async fn fetch_page(
            &self,
            _offset: usize,
            _limit: usize,
        ) -> Result<Vec<Record>, RequestError> {
            tokio::time::sleep(Duration::from_millis(80)).await;
            Ok(vec![Record {
                id: "1".to_string(),
                title: "t".to_string(),
                content: String::new(),
                publish_time: None,
                tags: vec![],
                entities: vec![],
                sentiment: Sentiment::Neutral,
                important: false,
            }])
        }
    }

    #[tokio::test]
    async fn overlapping_refresh_is_dropped() {
        let session = Arc::new(FeedSession::new(
            SlowSource,
            20,
            Duration::from_secs(60),
            AlertPolicy::default(),
            NotifierMux::new(vec![]),
        ));

        let first = {
            let s = session.clone();
            tokio::spawn(async move { s.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = session.refresh().await.unwrap();
        assert!(matches!(second, RefreshOutcome::Skipped));

        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, RefreshOutcome::Completed { added: 1, .. }));
    }
}
