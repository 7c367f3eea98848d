//! Batch summary counts.

use serde::Serialize;

use crate::labels::FlagKind;
use crate::record::ReviewRecord;

/// Counts over one batch. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub advertisement: usize,
    pub feedback: usize,
    pub irrelevant: usize,
    pub rant: usize,
    /// Records with at least one violation flag (advertisement, irrelevant, rant).
    pub flagged: usize,
}

impl Summary {
    pub fn count(&self, kind: FlagKind) -> usize {
        match kind {
            FlagKind::Advertisement => self.advertisement,
            FlagKind::Feedback => self.feedback,
            FlagKind::Irrelevant => self.irrelevant,
            FlagKind::Rant => self.rant,
        }
    }
}

/// Count records per flag in a single pass.
pub fn summarize(records: &[ReviewRecord]) -> Summary {
    let mut s = Summary {
        total: records.len(),
        ..Summary::default()
    };
    for r in records {
        s.advertisement += usize::from(r.advertisement);
        s.feedback += usize::from(r.feedback);
        s.irrelevant += usize::from(r.irrelevant);
        s.rant += usize::from(r.rant);
        s.flagged += usize::from(r.active_flags().any(|k| k.is_violation()));
    }
    s
}
