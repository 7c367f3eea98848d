//! Which review the detail pane shows.

use serde::{Deserialize, Serialize};

use crate::record::ReviewRecord;

/// Where a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A single pasted review; its result is selected automatically.
    SingleText,
    /// A CSV/spreadsheet upload; nothing is selected.
    FileBatch,
}

/// The selected record id, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Reset for a batch that replaced the previous one.
    pub fn on_new_batch(&mut self, records: &[ReviewRecord], source: SourceKind) {
        self.selected = match (source, records.first()) {
            (SourceKind::SingleText, Some(first)) => Some(first.id.clone()),
            _ => None,
        };
    }

    /// Overwrite the selection. Last call wins.
    pub fn on_manual_select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn on_batch_cleared(&mut self) {
        self.selected = None;
    }
}
