//! Raw classification results as the backend sends them.
//!
//! The payload is untrusted and its shape has changed across backend
//! versions. Every field is decoded on its own: a value of the wrong JSON type
//! reads as absent instead of rejecting the record, and per-flag booleans are
//! kept in [`RawResult::extra`] so both the legacy and the canonical names are
//! visible to the normalizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::SubmissionError;
use crate::labels::{FlagKind, FlagSet};

/// One backend result before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawResult {
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(
        rename = "fullText",
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_text: Option<String>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(
        rename = "qualityScore",
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub quality_score: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub prediction_confidence: Option<f64>,
    #[serde(deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub relevancy: Option<f64>,

    /// Legacy string labels. `Some(vec![])` is an explicit "clean" signal.
    #[serde(deserialize_with = "lenient::strings", skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::strings", skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<String>>,

    /// Per-label class probabilities.
    #[serde(deserialize_with = "lenient::probs", skip_serializing_if = "BTreeMap::is_empty")]
    pub probs: BTreeMap<String, f64>,
    #[serde(deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub predicted_class: Option<String>,

    /// Every other field, including the per-flag booleans.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a raw result encodes its flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagEncoding<'a> {
    /// No flag information at all.
    Bare,
    /// Only the legacy string-label list.
    Legacy(&'a [String]),
    /// Only per-flag booleans (the flags that are literally `true`).
    Boolean(FlagSet),
    /// Both; the normalizer ORs them.
    Mixed {
        labels: &'a [String],
        booleans: FlagSet,
    },
}

impl FlagEncoding<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Legacy(_) => "legacy",
            Self::Boolean(_) => "boolean",
            Self::Mixed { .. } => "mixed",
        }
    }
}

impl RawResult {
    /// Decode one element of the backend's `results` array.
    ///
    /// Anything that is not a JSON object degrades to an empty result.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|err| {
            warn!(error = %err, "result entry is not an object; treating as empty");
            RawResult::default()
        })
    }

    /// Set a per-flag boolean field, e.g. `Clean_Review_Flag`.
    pub fn with_boolean(mut self, field: &str, value: bool) -> Self {
        self.extra.insert(field.to_string(), Value::Bool(value));
        self
    }

    /// Flags set by boolean fields, or `None` when no boolean field is present.
    ///
    /// Only a literal `true` sets a flag; strings and numbers do not.
    pub fn boolean_flags(&self) -> Option<FlagSet> {
        let mut present = false;
        let mut set = FlagSet::default();
        for kind in FlagKind::ALL {
            for field in kind.boolean_fields() {
                match self.extra.get(*field) {
                    Some(Value::Bool(true)) => {
                        present = true;
                        set.insert(kind);
                    }
                    Some(Value::Bool(false)) => present = true,
                    _ => {}
                }
            }
        }
        present.then_some(set)
    }

    pub fn flag_encoding(&self) -> FlagEncoding<'_> {
        match (self.flags.as_deref(), self.boolean_flags()) {
            (None, None) => FlagEncoding::Bare,
            (Some(labels), None) => FlagEncoding::Legacy(labels),
            (None, Some(booleans)) => FlagEncoding::Boolean(booleans),
            (Some(labels), Some(booleans)) => FlagEncoding::Mixed { labels, booleans },
        }
    }
}

/// The `{ results: [...] }` envelope returned by both analyze endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub results: Vec<RawResult>,
}

impl AnalyzeResponse {
    /// Validate the envelope. A missing or non-array `results` is a format error;
    /// individual entries never are.
    pub fn from_value(value: Value) -> Result<Self, SubmissionError> {
        let Value::Object(mut body) = value else {
            return Err(SubmissionError::MalformedPayload(
                "response body is not a JSON object".into(),
            ));
        };
        match body.remove("results") {
            Some(Value::Array(items)) => Ok(Self {
                results: items.into_iter().map(RawResult::from_value).collect(),
            }),
            Some(_) => Err(SubmissionError::MalformedPayload(
                "`results` is not an array".into(),
            )),
            None => Err(SubmissionError::MalformedPayload(
                "response has no `results`".into(),
            )),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SubmissionError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| SubmissionError::MalformedPayload(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }
}

mod lenient {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub(super) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Value::deserialize(d)?.as_f64())
    }

    pub(super) fn strings<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }

    pub(super) fn probs<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => map
                .into_iter()
                .filter_map(|(k, v)| v.as_f64().map(|p| (k, p)))
                .collect(),
            _ => BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_result() {
        let raw = RawResult::from_value(json!({
            "id": 3,
            "place": "Cafe Nero",
            "user": "sam",
            "snippet": "Great coffee",
            "fullText": "Great coffee, slow service.",
            "timestamp": "2025-08-30",
            "relevancy": 0.93,
            "qualityScore": 0.88,
            "prediction_confidence": 0.91,
            "flags": [],
            "evidence": ["feedback: 0.91"],
            "probs": {"Clean Review": 0.91, "Advertisement": 0.03},
            "predicted_class": "feedback"
        }));
        assert_eq!(raw.id.as_deref(), Some("3"));
        assert_eq!(raw.full_text.as_deref(), Some("Great coffee, slow service."));
        assert_eq!(raw.quality_score, Some(0.88));
        assert_eq!(raw.prediction_confidence, Some(0.91));
        assert_eq!(raw.flags, Some(vec![]));
        assert_eq!(raw.evidence, Some(vec!["feedback: 0.91".to_string()]));
        assert_eq!(raw.probs.len(), 2);
        assert_eq!(raw.predicted_class.as_deref(), Some("feedback"));
        assert!(raw.extra.is_empty());
    }

    #[test]
    fn wrong_types_read_as_absent() {
        let raw = RawResult::from_value(json!({
            "place": ["not", "a", "string"],
            "qualityScore": "0.5",
            "flags": "Advertisement",
            "evidence": [1, "kept", null],
            "probs": [0.1, 0.9]
        }));
        assert_eq!(raw.place, None);
        assert_eq!(raw.quality_score, None);
        assert_eq!(raw.flags, None);
        assert_eq!(raw.evidence, Some(vec!["kept".to_string()]));
        assert!(raw.probs.is_empty());
    }

    #[test]
    fn nulls_read_as_absent() {
        let raw = RawResult::from_value(json!({
            "id": null,
            "prediction_confidence": null,
            "flags": null
        }));
        assert_eq!(raw, RawResult::default());
    }

    #[test]
    fn non_object_entry_degrades_to_empty() {
        assert_eq!(RawResult::from_value(json!("oops")), RawResult::default());
        assert_eq!(RawResult::from_value(json!(42)), RawResult::default());
    }

    #[test]
    fn boolean_flags_need_literal_true() {
        let raw = RawResult::from_value(json!({
            "Advertisement_Flag": true,
            "Clean_Review_Flag": "true",
            "Irrelevant_Content_Flag": 1,
            "Review_without_Visit_Flag": false
        }));
        let set = raw.boolean_flags().unwrap();
        assert_eq!(set, FlagSet::only(FlagKind::Advertisement));
    }

    #[test]
    fn canonical_boolean_names_are_accepted() {
        let raw = RawResult::default()
            .with_boolean("Feedback_Flag", true)
            .with_boolean("Rant_Flag", true);
        let set = raw.boolean_flags().unwrap();
        assert!(set.contains(FlagKind::Feedback));
        assert!(set.contains(FlagKind::Rant));
        assert!(!set.contains(FlagKind::Irrelevant));
    }

    #[test]
    fn flag_encoding_variants() {
        assert_eq!(RawResult::default().flag_encoding(), FlagEncoding::Bare);

        let legacy = RawResult {
            flags: Some(vec!["Rant".into()]),
            ..Default::default()
        };
        assert_eq!(legacy.flag_encoding().name(), "legacy");

        let boolean = RawResult::default().with_boolean("Advertisement_Flag", false);
        assert_eq!(
            boolean.flag_encoding(),
            FlagEncoding::Boolean(FlagSet::default())
        );

        let mixed = RawResult {
            flags: Some(vec![]),
            ..Default::default()
        }
        .with_boolean("Rant_Flag", true);
        assert_eq!(mixed.flag_encoding().name(), "mixed");
    }

    #[test]
    fn response_envelope() {
        let resp = AnalyzeResponse::from_value(json!({
            "results": [{"id": 1}, {"id": 2}, "junk"]
        }))
        .unwrap();
        assert_eq!(resp.results.len(), 3);
        assert_eq!(resp.results[1].id.as_deref(), Some("2"));
        assert_eq!(resp.results[2], RawResult::default());
    }

    #[test]
    fn response_without_results_is_malformed() {
        let err = AnalyzeResponse::from_value(json!({"error": "boom"})).unwrap_err();
        assert!(matches!(err, SubmissionError::MalformedPayload(_)));

        let err = AnalyzeResponse::from_value(json!({"results": {"id": 1}})).unwrap_err();
        assert_eq!(
            err,
            SubmissionError::MalformedPayload("`results` is not an array".into())
        );

        let err = AnalyzeResponse::from_value(json!([])).unwrap_err();
        assert!(matches!(err, SubmissionError::MalformedPayload(_)));
    }

    #[test]
    fn response_from_invalid_json() {
        let err = AnalyzeResponse::from_slice(b"<html>502</html>").unwrap_err();
        assert!(matches!(err, SubmissionError::MalformedPayload(m) if m.starts_with("invalid JSON")));

        let ok = AnalyzeResponse::from_slice(br#"{"results": []}"#).unwrap();
        assert!(ok.results.is_empty());
    }
}
