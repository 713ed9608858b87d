// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod client;
pub mod config;
pub mod detector;
pub mod engine;
pub mod fallback;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod notify;
pub mod session;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::client::{RequestClient, RequestConfig, RequestError};
pub use crate::detector::ChangeDetector;
pub use crate::engine::{ApplyMode, FeedEngine, FeedState};
pub use crate::fetch::{FlashFetcher, PageSource};
pub use crate::notify::{AlertPolicy, NotificationDecision, NotifierMux};
pub use crate::session::{FeedSession, RefreshOutcome};
pub use crate::types::{AssociatedEntity, Record, Sentiment};
