//! Requests the classification backend understands, and the trait that sends them.

use std::path::PathBuf;

use async_trait::async_trait;
use revlens_core::{AnalyzeResponse, SourceKind};
use serde::Serialize;

use crate::ClientError;

/// Body of `POST /api/analyze_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextSubmission {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TextSubmission {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Whitespace-only text counts as no input.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Column overrides for the backend's CSV/spreadsheet column detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnHints {
    pub text: Option<String>,
    pub place: Option<String>,
    pub user: Option<String>,
    pub timestamp: Option<String>,
}

impl ColumnHints {
    /// Multipart form fields for the hints that are set.
    pub fn form_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("text_column", &self.text),
            ("place_column", &self.place),
            ("user_column", &self.user),
            ("timestamp_column", &self.timestamp),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// A bulk upload for `POST /api/analyze_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSubmission {
    pub path: PathBuf,
    pub columns: ColumnHints,
}

impl FileSubmission {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            columns: ColumnHints::default(),
        }
    }

    /// File name sent with the multipart part.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

/// One resolved submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Text(TextSubmission),
    File(FileSubmission),
}

impl Submission {
    pub fn source(&self) -> SourceKind {
        match self {
            Self::Text(_) => SourceKind::SingleText,
            Self::File(_) => SourceKind::FileBatch,
        }
    }
}

/// A classification backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn analyze_text(&self, request: &TextSubmission) -> Result<AnalyzeResponse, ClientError>;

    async fn analyze_file(&self, request: &FileSubmission) -> Result<AnalyzeResponse, ClientError>;

    async fn analyze(&self, submission: &Submission) -> Result<AnalyzeResponse, ClientError> {
        match submission {
            Submission::Text(req) => self.analyze_text(req).await,
            Submission::File(req) => self.analyze_file(req).await,
        }
    }
}
