//! # Change Detector
//! Compares the id set held before a refresh with the records the refresh
//! produced and classifies the newly-seen subset. The prior snapshot is an
//! explicit field here, not ambient state, so independent feed sessions
//! never interfere.

use std::collections::HashSet;

use crate::normalize::FOCUS_TAG;
use crate::notify::NotificationDecision;
use crate::types::Record;

#[derive(Debug, Default)]
pub struct ChangeDetector {
    prior_ids: HashSet<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids currently considered "already seen".
    pub fn prior_ids(&self) -> &HashSet<String> {
        &self.prior_ids
    }

    /// Record ids merged by a load-more so the next refresh does not treat
    /// them as new.
    pub fn track(&mut self, records: &[Record]) {
        for rec in records {
            self.prior_ids.insert(rec.id.clone());
        }
    }

    /// Evaluate a completed refresh. Replaces the snapshot with the refreshed
    /// feed's ids and returns a decision for the delta, if any.
    pub fn on_refresh_complete(&mut self, records: &[Record]) -> Option<NotificationDecision> {
        let previous = std::mem::replace(
            &mut self.prior_ids,
            records.iter().map(|r| r.id.clone()).collect(),
        );
        let decision = evaluate(&previous, records);
        if let Some(d) = &decision {
            tracing::info!(
                target: "detector",
                count = d.count,
                has_important = d.has_important,
                sentiment = d.dominant_sentiment.as_str(),
                "new records detected"
            );
        }
        decision
    }
}

/// Pure classification of a refresh delta.
///
/// The first-ever load has nothing to compare against and never yields a
/// decision; neither does an empty delta. Dominant sentiment is taken from
/// the first (most recent) delta record, deliberately not a majority vote.
pub fn evaluate(
    previous_ids: &HashSet<String>,
    new_records: &[Record],
) -> Option<NotificationDecision> {
    if previous_ids.is_empty() {
        return None;
    }

    let delta: Vec<&Record> = new_records
        .iter()
        .filter(|r| !previous_ids.contains(&r.id))
        .collect();
    let first = delta.first()?;

    let has_important = delta
        .iter()
        .any(|r| r.important || r.tags.iter().any(|t| t == FOCUS_TAG));

    Some(NotificationDecision {
        count: delta.len(),
        has_important,
        dominant_sentiment: first.sentiment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sentiment;

    fn rec(id: &str, sentiment: Sentiment, important: bool) -> Record {
        Record {
            id: id.to_string(),
            title: id.to_string(),
            content: String::new(),
            publish_time: None,
            tags: vec![],
            entities: vec![],
            sentiment,
            important,
        }
    }

    #[test]
    fn first_load_is_silent_even_with_records() {
        let mut det = ChangeDetector::new();
        let recs = vec![rec("1", Sentiment::Positive, true)];
        assert!(det.on_refresh_complete(&recs).is_none());
        // snapshot is now in place, a repeat refresh with the same ids stays quiet
        assert!(det.on_refresh_complete(&recs).is_none());
    }

    #[test]
    fn snapshot_is_replaced_not_accumulated_on_refresh() {
        let mut det = ChangeDetector::new();
        det.on_refresh_complete(&[rec("1", Sentiment::Neutral, false)]);
        det.on_refresh_complete(&[rec("2", Sentiment::Neutral, false)]);
        // "1" left the snapshot with the second refresh
        assert!(!det.prior_ids().contains("1"));
        assert!(det.prior_ids().contains("2"));
    }

    #[test]
    fn tracked_load_more_ids_do_not_renotify() {
        let mut det = ChangeDetector::new();
        det.on_refresh_complete(&[rec("1", Sentiment::Neutral, false)]);
        det.track(&[rec("2", Sentiment::Negative, false)]);
        let refreshed = vec![
            rec("2", Sentiment::Negative, false),
            rec("1", Sentiment::Neutral, false),
        ];
        assert!(det.on_refresh_complete(&refreshed).is_none());
    }
}
