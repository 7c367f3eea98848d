//! Review classification results: raw backend payloads, canonical records,
//! batch summaries, evidence, and session state.

pub mod badge;
mod error;
pub mod evidence;
pub mod labels;
pub mod raw;
pub mod record;
pub mod selection;
pub mod session;
pub mod summary;

pub use badge::{Badge, ScoreBand, badges, format_percent};
pub use error::SubmissionError;
pub use evidence::evidence_for;
pub use labels::{FlagKind, FlagSet, LabelTable};
pub use raw::{AnalyzeResponse, FlagEncoding, RawResult};
pub use record::{ReviewRecord, normalize, normalize_batch, normalize_with};
pub use selection::{Selection, SourceKind};
pub use session::{Session, SessionEvent, SessionView};
pub use summary::{Summary, summarize};
