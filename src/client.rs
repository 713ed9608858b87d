//! # Resilient Request Client
//! One logical GET = up to `max_retries + 1` attempts. Each attempt runs
//! under its own timeout (dropping the in-flight future cancels it), failed
//! attempts wait a linearly growing backoff, and the first successful
//! response short-circuits the loop.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Classified failure of one logical request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Transport failure, no response received.
    #[error("network error: {0}")]
    Network(String),
    /// Response received with a non-2xx status.
    #[error("http status {status}")]
    Http { status: u16 },
    /// Body received but not decodable as JSON.
    #[error("parse error: {0}")]
    Parse(String),
    /// A single attempt exceeded its timeout.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
    /// All attempts failed; wraps the classification of the last one.
    #[error("retries exhausted: {0}")]
    Exhausted(#[source] Box<RequestError>),
}

impl RequestError {
    /// Unwrap one `Exhausted` layer to inspect the last attempt's failure.
    pub fn last_cause(&self) -> &RequestError {
        match self {
            RequestError::Exhausted(inner) => inner,
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Base backoff unit; attempt n waits `retry_delay * (n + 1)`.
    pub retry_delay: Duration,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestClient {
    http: reqwest::Client,
    base_url: String,
    cfg: RequestConfig,
}

impl RequestClient {
    pub fn new(base_url: impl Into<String>, cfg: RequestConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("flash-feed/0.1 (+feed sync engine)")
            .connect_timeout(Duration::from_secs(4))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: base_url.into(),
            cfg,
        }
    }

    /// GET `base_url + path` with `query` pairs and parse the body as JSON.
    ///
    /// Non-2xx statuses and per-attempt timeouts consume a retry; a 2xx body
    /// that fails to decode returns `Parse` immediately (the upstream
    /// answered, retrying would replay the same payload).
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Value, RequestError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let attempts = self.cfg.max_retries.saturating_add(1);
        let mut last_err = RequestError::Network("request not attempted".to_string());

        for attempt in 0..attempts {
            tracing::debug!(target: "client", %url, attempt, "request attempt");
            match self.attempt(&url, query).await {
                Ok(v) => {
                    tracing::debug!(target: "client", %url, attempt, "request ok");
                    return Ok(v);
                }
                Err(e @ RequestError::Parse(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(target: "client", %url, attempt, error = %e, "attempt failed");
                    last_err = e;
                }
            }
            if attempt + 1 < attempts {
                // Linear backoff: base * (attempt_number + 1).
                tokio::time::sleep(self.cfg.retry_delay * (attempt + 1)).await;
            }
        }

        Err(RequestError::Exhausted(Box::new(last_err)))
    }

    /// One attempt: headers and body share a single timeout budget; crossing
    /// the deadline drops the in-flight request.
    async fn attempt(&self, url: &str, query: &[(String, String)]) -> Result<Value, RequestError> {
        let exchange = async {
            let resp = self
                .http
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| RequestError::Network(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(RequestError::Http {
                    status: status.as_u16(),
                });
            }

            let body = resp
                .text()
                .await
                .map_err(|e| RequestError::Network(e.to_string()))?;
            serde_json::from_str(&body).map_err(|e| RequestError::Parse(e.to_string()))
        };

        match tokio::time::timeout(self.cfg.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(RequestError::Timeout(self.cfg.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_cause_unwraps_exhausted() {
        let e = RequestError::Exhausted(Box::new(RequestError::Http { status: 502 }));
        assert!(matches!(e.last_cause(), RequestError::Http { status: 502 }));
        let plain = RequestError::Network("x".into());
        assert!(matches!(plain.last_cause(), RequestError::Network(_)));
    }

    #[test]
    fn default_config_is_bounded() {
        let cfg = RequestConfig::default();
        assert!(cfg.max_retries < 10);
        assert!(cfg.timeout >= Duration::from_secs(1));
    }
}
