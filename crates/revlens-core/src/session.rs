//! Session state: the current batch, selection, busy flag, and last error.
//!
//! Every change goes through [`Session::apply`] with a [`SessionEvent`]. The
//! batch is swapped wholesale on each load or failure, never merged.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SubmissionError;
use crate::evidence::evidence_for;
use crate::labels::LabelTable;
use crate::raw::RawResult;
use crate::record::{ReviewRecord, normalize_batch};
use crate::selection::{Selection, SourceKind};
use crate::summary::{Summary, summarize};

/// Everything that can happen to a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A submission was sent. Does not block further submissions.
    SubmissionStarted,
    /// The backend answered with results.
    BatchLoaded {
        results: Vec<RawResult>,
        source: SourceKind,
    },
    /// The submission failed at any stage.
    BatchFailed(SubmissionError),
    /// The operator picked a row.
    ReviewSelected(String),
    /// The operator dismissed the error message.
    ErrorCleared,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    labels: LabelTable,
    records: Arc<[ReviewRecord]>,
    selection: Selection,
    busy: bool,
    error: Option<SubmissionError>,
}

/// What the presentation layer needs to draw a session.
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub records: &'a [ReviewRecord],
    pub summary: Summary,
    pub selected: Option<&'a ReviewRecord>,
    /// Evidence for the selected record; empty when nothing is selected.
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose batches are normalized with a custom label table.
    pub fn with_labels(labels: LabelTable) -> Self {
        Self {
            labels,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SubmissionStarted => {
                if self.busy {
                    debug!("submission started while another is in flight");
                }
                self.busy = true;
            }
            SessionEvent::BatchLoaded { results, source } => {
                let records: Arc<[ReviewRecord]> = normalize_batch(results, &self.labels).into();
                self.selection.on_new_batch(&records, source);
                self.records = records;
                self.error = None;
                self.busy = false;
                info!(count = self.records.len(), source = ?source, "batch loaded");
            }
            SessionEvent::BatchFailed(err) => {
                warn!(error = %err, "batch failed");
                self.records = Arc::from(Vec::new());
                self.selection.on_batch_cleared();
                self.error = Some(err);
                self.busy = false;
            }
            SessionEvent::ReviewSelected(id) => {
                self.select(&id);
            }
            SessionEvent::ErrorCleared => self.error = None,
        }
    }

    /// Select a record by id. Ids outside the current batch are refused and
    /// the selection is left as it was.
    pub fn select(&mut self, id: &str) -> bool {
        if self.records.iter().any(|r| r.id == id) {
            self.selection.on_manual_select(id);
            true
        } else {
            warn!(id, "ignoring selection of id not in current batch");
            false
        }
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Recomputed on every call.
    pub fn summary(&self) -> Summary {
        summarize(&self.records)
    }

    pub fn selected(&self) -> Option<&ReviewRecord> {
        let id = self.selection.selected()?;
        self.records.iter().find(|r| r.id == id)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        self.error.as_ref()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn view(&self) -> SessionView<'_> {
        let selected = self.selected();
        SessionView {
            records: &self.records,
            summary: self.summary(),
            selected,
            evidence: selected.map(evidence_for).unwrap_or_default(),
            error: self.error.as_ref().map(ToString::to_string),
        }
    }
}
