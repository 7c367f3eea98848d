//! Canonical review records and the normalizer that produces them.
//!
//! # Resolution rules
//!
//! - Confidence: `prediction_confidence`, else `qualityScore`, else 0, then
//!   clamped into `[0, 1]` (non-finite values become 0).
//! - Each flag is the OR of its boolean fields and the label table matches on
//!   `flags`. An empty `flags` list also sets Feedback. No signal means false.
//! - Descriptive fields fall back to placeholders; an absent snippet is cut
//!   from the full text.
//! - `originalFlags` keeps the label list verbatim.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::labels::{FlagKind, FlagSet, LabelTable};
use crate::raw::{FlagEncoding, RawResult};

pub const UNKNOWN_PLACE: &str = "Unknown Place";
pub const ANONYMOUS: &str = "Anonymous";
pub const NOT_AVAILABLE: &str = "N/A";

/// Characters kept when deriving a snippet from the full text.
pub const SNIPPET_CHARS: usize = 120;

/// A normalized review. Built once by [`normalize`] and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub place: String,
    pub user: String,
    pub snippet: String,
    #[serde(rename = "fullText")]
    pub full_text: String,
    pub timestamp: String,
    pub prediction_confidence: f64,
    #[serde(rename = "Advertisement_Flag")]
    pub advertisement: bool,
    #[serde(rename = "Feedback_Flag")]
    pub feedback: bool,
    #[serde(rename = "Irrelevant_Flag")]
    pub irrelevant: bool,
    #[serde(rename = "Rant_Flag")]
    pub rant: bool,
    #[serde(rename = "originalFlags")]
    pub original_flags: Vec<String>,
    pub evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevancy: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub probs: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_class: Option<String>,
}

impl ReviewRecord {
    pub fn flag(&self, kind: FlagKind) -> bool {
        match kind {
            FlagKind::Advertisement => self.advertisement,
            FlagKind::Feedback => self.feedback,
            FlagKind::Irrelevant => self.irrelevant,
            FlagKind::Rant => self.rant,
        }
    }

    pub fn flags(&self) -> FlagSet {
        FlagKind::ALL.into_iter().filter(|k| self.flag(*k)).collect()
    }

    /// Active flags in display order.
    pub fn active_flags(&self) -> impl Iterator<Item = FlagKind> + '_ {
        FlagKind::ALL.into_iter().filter(|k| self.flag(*k))
    }

    /// Re-express this record as a raw result using the canonical boolean names.
    ///
    /// Normalizing the output yields an identical record.
    pub fn to_raw(&self) -> RawResult {
        let mut raw = RawResult {
            id: Some(self.id.clone()),
            place: Some(self.place.clone()),
            user: Some(self.user.clone()),
            snippet: Some(self.snippet.clone()),
            full_text: Some(self.full_text.clone()),
            timestamp: Some(self.timestamp.clone()),
            prediction_confidence: Some(self.prediction_confidence),
            relevancy: self.relevancy,
            // An empty list would read as an explicit clean signal.
            flags: (!self.original_flags.is_empty()).then(|| self.original_flags.clone()),
            evidence: Some(self.evidence.clone()),
            probs: self.probs.clone(),
            predicted_class: self.predicted_class.clone(),
            ..Default::default()
        };
        for kind in FlagKind::ALL {
            raw = raw.with_boolean(kind.field_name(), self.flag(kind));
        }
        raw
    }
}

/// Normalize one raw result with the default label table.
pub fn normalize(raw: RawResult) -> ReviewRecord {
    normalize_with(raw, &LabelTable::default())
}

/// Normalize one raw result. A missing id becomes `"1"`, its batch position.
pub fn normalize_with(raw: RawResult, labels: &LabelTable) -> ReviewRecord {
    normalize_at(raw, labels, 1)
}

/// Normalize a whole backend response, keeping ids unique within the batch.
///
/// A result without an id gets its 1-based position; a repeated id gets
/// `#<position>` appended.
pub fn normalize_batch(raws: Vec<RawResult>, labels: &LabelTable) -> Vec<ReviewRecord> {
    let mut seen = HashSet::with_capacity(raws.len());
    let mut out = Vec::with_capacity(raws.len());
    for (i, raw) in raws.into_iter().enumerate() {
        let position = i + 1;
        let mut record = normalize_at(raw, labels, position);
        if !seen.insert(record.id.clone()) {
            let renamed = format!("{}#{position}", record.id);
            warn!(id = %record.id, renamed = %renamed, "duplicate result id in batch");
            record.id = renamed;
            seen.insert(record.id.clone());
        }
        out.push(record);
    }
    out
}

fn normalize_at(raw: RawResult, labels: &LabelTable, position: usize) -> ReviewRecord {
    let flags = resolve_flags(&raw, labels);
    let prediction_confidence = resolve_confidence(raw.prediction_confidence, raw.quality_score);

    let full_text = present(raw.full_text);
    let snippet = present(raw.snippet)
        .or_else(|| full_text.as_deref().map(snippet_of))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    ReviewRecord {
        id: present(raw.id).unwrap_or_else(|| position.to_string()),
        place: present(raw.place).unwrap_or_else(|| UNKNOWN_PLACE.to_string()),
        user: present(raw.user).unwrap_or_else(|| ANONYMOUS.to_string()),
        snippet,
        full_text: full_text.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        timestamp: present(raw.timestamp).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        prediction_confidence,
        advertisement: flags.contains(FlagKind::Advertisement),
        feedback: flags.contains(FlagKind::Feedback),
        irrelevant: flags.contains(FlagKind::Irrelevant),
        rant: flags.contains(FlagKind::Rant),
        original_flags: raw.flags.unwrap_or_default(),
        evidence: raw.evidence.unwrap_or_default(),
        relevancy: raw.relevancy,
        probs: raw.probs,
        predicted_class: present(raw.predicted_class),
    }
}

fn resolve_flags(raw: &RawResult, labels: &LabelTable) -> FlagSet {
    let encoding = raw.flag_encoding();
    debug!(id = ?raw.id, encoding = encoding.name(), "resolving flags");
    match encoding {
        FlagEncoding::Bare => FlagSet::default(),
        FlagEncoding::Boolean(booleans) => booleans,
        FlagEncoding::Legacy(list) => flags_from_labels(list, labels),
        FlagEncoding::Mixed {
            labels: list,
            booleans,
        } => booleans.union(flags_from_labels(list, labels)),
    }
}

fn flags_from_labels(list: &[String], labels: &LabelTable) -> FlagSet {
    if list.is_empty() {
        return FlagSet::only(FlagKind::Feedback);
    }
    let matched = labels.resolve(list);
    if !matched.unknown.is_empty() {
        warn!(unknown = ?matched.unknown, "unrecognised flag labels");
    }
    matched.flags
}

fn resolve_confidence(prediction: Option<f64>, quality: Option<f64>) -> f64 {
    let value = prediction.or(quality).unwrap_or(0.0);
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn snippet_of(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawResult {
        RawResult::from_value(value)
    }

    #[test]
    fn legacy_advertisement_scenario() {
        let rec = normalize(raw(json!({"qualityScore": 0.81, "flags": ["Advertisement"]})));
        assert_eq!(rec.prediction_confidence, 0.81);
        assert!(rec.advertisement);
        assert!(!rec.feedback);
        assert!(!rec.irrelevant);
        assert!(!rec.rant);
        assert_eq!(rec.original_flags, vec!["Advertisement"]);
    }

    #[test]
    fn empty_result_scenario() {
        let rec = normalize(raw(json!({})));
        assert_eq!(rec.prediction_confidence, 0.0);
        assert!(rec.flags().is_empty());
        assert_eq!(rec.place, "Unknown Place");
        assert_eq!(rec.user, "Anonymous");
        assert_eq!(rec.timestamp, "N/A");
        assert_eq!(rec.full_text, "N/A");
        assert_eq!(rec.snippet, "N/A");
        assert!(rec.original_flags.is_empty());
        assert!(rec.evidence.is_empty());
        assert_eq!(rec.id, "1");
    }

    #[test]
    fn quality_score_is_the_fallback() {
        for score in [0.0, 0.25, 0.5, 0.99, 1.0] {
            let rec = normalize(raw(json!({"qualityScore": score})));
            assert_eq!(rec.prediction_confidence, score);
        }
    }

    #[test]
    fn prediction_confidence_wins_even_when_zero() {
        let rec = normalize(raw(json!({"prediction_confidence": 0.0, "qualityScore": 0.7})));
        assert_eq!(rec.prediction_confidence, 0.0);

        let rec = normalize(raw(json!({"prediction_confidence": 0.64, "qualityScore": 0.7})));
        assert_eq!(rec.prediction_confidence, 0.64);
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(normalize(raw(json!({"qualityScore": 1.7}))).prediction_confidence, 1.0);
        assert_eq!(
            normalize(raw(json!({"prediction_confidence": -0.2}))).prediction_confidence,
            0.0
        );
        assert_eq!(resolve_confidence(Some(f64::NAN), Some(0.5)), 0.0);
    }

    #[test]
    fn empty_flag_list_means_feedback() {
        let rec = normalize(raw(json!({"flags": []})));
        assert!(rec.feedback);
        assert!(!rec.advertisement && !rec.irrelevant && !rec.rant);
    }

    #[test]
    fn absent_flag_list_is_not_feedback() {
        let rec = normalize(raw(json!({"qualityScore": 0.9})));
        assert!(!rec.feedback);
    }

    #[test]
    fn both_rant_labels_set_rant() {
        for label in ["Rant", "Rant (no visit)"] {
            let rec = normalize(raw(json!({"flags": [label]})));
            assert!(rec.rant, "{label} should set Rant_Flag");
            assert!(!rec.feedback);
        }
    }

    #[test]
    fn clean_review_label_sets_feedback() {
        let rec = normalize(raw(json!({"flags": ["Clean Review"]})));
        assert!(rec.feedback);
    }

    #[test]
    fn legacy_booleans_set_flags() {
        let rec = normalize(raw(json!({
            "Advertisement_Flag": true,
            "Clean_Review_Flag": false,
            "Irrelevant_Content_Flag": true,
            "Review_without_Visit_Flag": true
        })));
        assert!(rec.advertisement);
        assert!(!rec.feedback);
        assert!(rec.irrelevant);
        assert!(rec.rant);
        assert!(rec.original_flags.is_empty());
    }

    #[test]
    fn booleans_and_labels_are_ored() {
        let rec = normalize(raw(json!({
            "flags": ["Irrelevant"],
            "Advertisement_Flag": true,
            "Irrelevant_Content_Flag": false
        })));
        assert!(rec.advertisement);
        assert!(rec.irrelevant);
        assert!(!rec.feedback);
    }

    #[test]
    fn unknown_labels_are_kept_but_set_nothing() {
        let rec = normalize(raw(json!({"flags": ["Spam", "Spam"]})));
        assert!(rec.flags().is_empty());
        assert_eq!(rec.original_flags, vec!["Spam", "Spam"]);
    }

    #[test]
    fn custom_label_table() {
        let table = LabelTable::default().with_alias("Spam", FlagKind::Advertisement);
        let rec = normalize_with(raw(json!({"flags": ["Spam"]})), &table);
        assert!(rec.advertisement);
    }

    #[test]
    fn descriptive_fields_pass_through() {
        let rec = normalize(raw(json!({
            "id": 7,
            "place": "Blue Bottle",
            "user": "",
            "snippet": "Lovely",
            "fullText": "Lovely place",
            "timestamp": "2025-01-02",
            "relevancy": 0.42,
            "predicted_class": "feedback"
        })));
        assert_eq!(rec.id, "7");
        assert_eq!(rec.place, "Blue Bottle");
        assert_eq!(rec.user, "Anonymous");
        assert_eq!(rec.snippet, "Lovely");
        assert_eq!(rec.full_text, "Lovely place");
        assert_eq!(rec.timestamp, "2025-01-02");
        assert_eq!(rec.relevancy, Some(0.42));
        assert_eq!(rec.predicted_class.as_deref(), Some("feedback"));
    }

    #[test]
    fn snippet_derived_from_full_text() {
        let short = normalize(raw(json!({"fullText": "Short one"})));
        assert_eq!(short.snippet, "Short one");

        let long_text = "é".repeat(130);
        let long = normalize(raw(json!({"fullText": long_text})));
        assert_eq!(long.snippet.chars().count(), SNIPPET_CHARS + 1);
        assert!(long.snippet.ends_with('…'));
    }

    #[test]
    fn normalizing_a_canonical_record_is_idempotent() {
        let inputs = [
            json!({"id": 1, "qualityScore": 0.81, "flags": ["Advertisement"], "fullText": "Buy now"}),
            json!({"id": 2, "flags": []}),
            json!({}),
            json!({"Review_without_Visit_Flag": true, "evidence": ["rant: 0.77"], "probs": {"Rant (no visit)": 0.77}}),
            json!({"flags": ["Rant (no visit)", "Irrelevant"], "relevancy": 0.1}),
        ];
        for input in inputs {
            let first = normalize(raw(input));
            let second = normalize(first.to_raw());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn canonical_record_serializes_with_wire_names() {
        let rec = normalize(raw(json!({"flags": ["Rant"]})));
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["Rant_Flag"], json!(true));
        assert_eq!(value["Feedback_Flag"], json!(false));
        assert_eq!(value["originalFlags"], json!(["Rant"]));
        assert_eq!(value["fullText"], json!("N/A"));
        assert!(value.get("relevancy").is_none());

        // Only the flags and confidence survive re-ingestion; `originalFlags`
        // is not read back. Use `to_raw` for a full round trip.
        let again = normalize(RawResult::from_value(value));
        assert_eq!(again.flags(), rec.flags());
        assert_eq!(again.prediction_confidence, rec.prediction_confidence);
        assert!(again.original_flags.is_empty());
        assert_eq!(normalize(rec.to_raw()), rec);
    }

    #[test]
    fn batch_assigns_positions_and_dedups_ids() {
        let batch = normalize_batch(
            vec![
                raw(json!({"id": "a"})),
                raw(json!({})),
                raw(json!({"id": "a"})),
                raw(json!({"id": ""})),
            ],
            &LabelTable::default(),
        );
        let ids: Vec<_> = batch.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "2", "a#3", "4"]);
    }

    #[test]
    fn batch_keeps_order_and_length() {
        let batch = normalize_batch(
            vec![
                raw(json!({"id": 1, "flags": ["Rant"]})),
                raw(json!({"id": 2, "flags": []})),
            ],
            &LabelTable::default(),
        );
        assert_eq!(batch.len(), 2);
        assert!(batch[0].rant);
        assert!(batch[1].feedback);
    }
}
