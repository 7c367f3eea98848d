//! Evidence shown in the detail pane.

use crate::record::ReviewRecord;

/// Backend evidence when there is any, otherwise one synthesized line per
/// active flag in display order. Empty when neither exists.
pub fn evidence_for(record: &ReviewRecord) -> Vec<String> {
    if !record.evidence.is_empty() {
        return record.evidence.clone();
    }
    record
        .active_flags()
        .map(|kind| format!("{} detected by ML model", kind.label()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawResult;
    use crate::record::normalize;
    use serde_json::json;

    fn record(value: serde_json::Value) -> ReviewRecord {
        normalize(RawResult::from_value(value))
    }

    #[test]
    fn synthesizes_from_active_flag() {
        let r = record(json!({"Advertisement_Flag": true, "evidence": []}));
        assert_eq!(evidence_for(&r), vec!["Advertisement detected by ML model"]);
    }

    #[test]
    fn backend_evidence_overrides_synthesis() {
        let r = record(json!({"flags": ["Advertisement", "Rant"], "evidence": ["x"]}));
        assert_eq!(evidence_for(&r), vec!["x"]);
    }

    #[test]
    fn synthesized_lines_follow_display_order() {
        let r = record(json!({"flags": ["Rant (no visit)", "Irrelevant", "Advertisement"]}));
        assert_eq!(
            evidence_for(&r),
            vec![
                "Advertisement detected by ML model",
                "Irrelevant detected by ML model",
                "Rant detected by ML model",
            ]
        );
    }

    #[test]
    fn feedback_uses_its_display_label() {
        let r = record(json!({"flags": []}));
        assert_eq!(evidence_for(&r), vec!["Feedback detected by ML model"]);
    }

    #[test]
    fn nothing_to_show() {
        let r = record(json!({}));
        assert!(evidence_for(&r).is_empty());
    }
}
