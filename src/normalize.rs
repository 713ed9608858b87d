//! Raw upstream items → normalized [`Record`]s.
//!
//! The upstream returns stored flash objects enriched with an analysis block.
//! Sentiment and importance are derived here, once, from lexical markers in
//! that block; they are immutable afterwards.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::types::{AssociatedEntity, Record, Sentiment};

/// Marker meaning "positive" in the upstream analysis sentiment text.
pub const POSITIVE_MARKER: &str = "积极";
/// Marker meaning "negative" in the upstream analysis sentiment text.
pub const NEGATIVE_MARKER: &str = "消极";
/// Category meaning "major opportunity"; flags a flash as important.
pub const HIGH_PRIORITY_CATEGORY: &str = "重大先机";
/// Tag marking a flash as focus/headline material.
pub const FOCUS_TAG: &str = "焦点";

/// Max chars of content used when no upstream title is suggested.
const TITLE_PREFIX_CHARS: usize = 40;

// ---- upstream wire shape ----

#[derive(Debug, Clone, Deserialize)]
pub struct RawFlash {
    pub flash_id: Option<String>,
    #[serde(default)]
    pub content: String,
    pub publish_timestamp_utc: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub associated_symbols: Vec<RawSymbol>,
    pub llm_analysis: Option<RawAnalysis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSymbol {
    pub market: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAnalysis {
    pub suggested_title: Option<String>,
    pub summary: Option<String>,
    pub sentiment: Option<String>,
    pub category: Option<String>,
}

// ---- text cleanup ----

/// Clean flash text: decode HTML entities, strip tags, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();

    out.trim().to_string()
}

// ---- derivations ----

/// Presence of the positive/negative marker decides; absent or ambiguous
/// (both markers) falls back to neutral.
pub fn classify_sentiment(analysis_sentiment: Option<&str>) -> Sentiment {
    let Some(text) = analysis_sentiment else {
        return Sentiment::Neutral;
    };
    let pos = text.contains(POSITIVE_MARKER);
    let neg = text.contains(NEGATIVE_MARKER);
    match (pos, neg) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

pub fn is_important(category: Option<&str>, tags: &[String]) -> bool {
    category == Some(HIGH_PRIORITY_CATEGORY) || tags.iter().any(|t| t == FOCUS_TAG)
}

/// Prefer the upstream-suggested title; fall back to a truncated content
/// prefix (char-boundary safe).
pub fn derive_title(suggested: Option<&str>, content: &str) -> String {
    if let Some(t) = suggested {
        let t = t.trim();
        if !t.is_empty() {
            return t.to_string();
        }
    }
    let mut prefix: String = content.chars().take(TITLE_PREFIX_CHARS).collect();
    if content.chars().count() > TITLE_PREFIX_CHARS {
        prefix.push('…');
    }
    prefix
}

fn parse_publish_time(ts: Option<&str>) -> Option<DateTime<Utc>> {
    let ts = ts?;
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Map one raw upstream item into a [`Record`]. Items without a stable id
/// cannot participate in dedup and are dropped.
pub fn normalize_item(raw: RawFlash) -> Option<Record> {
    let id = raw.flash_id.filter(|s| !s.trim().is_empty())?;

    let content = clean_text(&raw.content);
    let analysis = raw.llm_analysis.as_ref();
    let sentiment = classify_sentiment(analysis.and_then(|a| a.sentiment.as_deref()));
    let important = is_important(analysis.and_then(|a| a.category.as_deref()), &raw.tags);
    let title = derive_title(analysis.and_then(|a| a.suggested_title.as_deref()), &content);
    let publish_time = parse_publish_time(raw.publish_timestamp_utc.as_deref());

    let entities = raw
        .associated_symbols
        .into_iter()
        .filter_map(|s| {
            let symbol = s.symbol?.to_ascii_uppercase();
            let market = s.market?;
            Some(AssociatedEntity {
                name: s.name.unwrap_or_default(),
                symbol,
                market,
            })
        })
        .collect();

    Some(Record {
        id,
        title,
        content,
        publish_time,
        tags: raw.tags,
        entities,
        sentiment,
        important,
    })
}
