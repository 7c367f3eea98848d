use thiserror::Error;

/// Why a submission produced no batch.
///
/// Raised only at the submission boundary; normalization and aggregation are
/// total and never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("request to classification backend failed: {0}")]
    Transport(String),

    #[error("backend returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("malformed backend response: {0}")]
    MalformedPayload(String),

    #[error("no input provided: paste review text or choose a file")]
    NoInput,
}
