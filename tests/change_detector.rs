// tests/change_detector.rs
// Refresh delta classification: first-load silence, delta correctness,
// importance and dominant sentiment.

use std::collections::HashSet;

use flash_feed::detector::{evaluate, ChangeDetector};
use flash_feed::types::{Record, Sentiment};

fn rec(id: u32, sentiment: Sentiment, important: bool) -> Record {
    Record {
        id: id.to_string(),
        title: format!("flash {id}"),
        content: String::new(),
        publish_time: None,
        tags: vec![],
        entities: vec![],
        sentiment,
        important,
    }
}

fn neutral(ids: impl IntoIterator<Item = u32>) -> Vec<Record> {
    ids.into_iter()
        .map(|i| rec(i, Sentiment::Neutral, false))
        .collect()
}

#[test]
fn empty_prior_snapshot_never_notifies() {
    let prior = HashSet::new();
    let records = vec![rec(1, Sentiment::Negative, true)];
    assert!(evaluate(&prior, &records).is_none());
}

#[test]
fn empty_delta_never_notifies() {
    let prior: HashSet<String> = ["1".to_string(), "2".to_string()].into();
    assert!(evaluate(&prior, &neutral(1..=2)).is_none());
    assert!(evaluate(&prior, &[]).is_none());
}

#[test]
fn delta_is_set_difference_by_id() {
    let prior: HashSet<String> = (1..=10).map(|i| i.to_string()).collect();
    let refreshed = neutral(8..=12); // 11, 12 are new
    let d = evaluate(&prior, &refreshed).unwrap();
    assert_eq!(d.count, 2);
}

#[test]
fn refresh_with_no_new_ids_stays_quiet_after_load_more() {
    // First page 1..=20, load-more appended 21..=34, then the
    // next refresh returns only 1..=20 again.
    let mut det = ChangeDetector::new();
    assert!(det.on_refresh_complete(&neutral(1..=20)).is_none());
    det.track(&neutral(21..=34));

    assert!(det.on_refresh_complete(&neutral(1..=20)).is_none());
}

#[test]
fn new_records_classify_count_importance_and_sentiment() {
    // Two new ids at the head of the refreshed page; the most
    // recent one (35) carries the sentiment, 36 the importance flag.
    let mut det = ChangeDetector::new();
    det.on_refresh_complete(&neutral(1..=20));
    det.track(&neutral(21..=34));

    let mut refreshed = vec![
        rec(35, Sentiment::Negative, false),
        rec(36, Sentiment::Positive, true),
    ];
    refreshed.extend(neutral(1..=18));

    let d = det.on_refresh_complete(&refreshed).unwrap();
    assert_eq!(d.count, 2);
    assert!(d.has_important);
    assert_eq!(d.dominant_sentiment, Sentiment::Negative);
}

#[test]
fn focus_tag_counts_as_important() {
    let mut det = ChangeDetector::new();
    det.on_refresh_complete(&neutral(1..=2));

    let mut tagged = rec(3, Sentiment::Neutral, false);
    tagged.tags.push("焦点".to_string());
    let mut refreshed = vec![tagged];
    refreshed.extend(neutral(1..=2));

    let d = det.on_refresh_complete(&refreshed).unwrap();
    assert_eq!(d.count, 1);
    assert!(d.has_important);
    assert_eq!(d.dominant_sentiment, Sentiment::Neutral);
}

#[test]
fn dominant_sentiment_is_first_delta_record_not_majority() {
    let mut det = ChangeDetector::new();
    det.on_refresh_complete(&neutral(1..=3));

    // one positive head, two negative behind it: head wins
    let refreshed = vec![
        rec(10, Sentiment::Positive, false),
        rec(11, Sentiment::Negative, false),
        rec(12, Sentiment::Negative, false),
    ];
    let d = det.on_refresh_complete(&refreshed).unwrap();
    assert_eq!(d.count, 3);
    assert_eq!(d.dominant_sentiment, Sentiment::Positive);
}
