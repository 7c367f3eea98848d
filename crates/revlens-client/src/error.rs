use std::path::PathBuf;

use revlens_core::SubmissionError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response format: {0}")]
    Format(String),
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ClientError> for SubmissionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Server { status, message } => SubmissionError::Server { status, message },
            ClientError::Json(e) => SubmissionError::MalformedPayload(e.to_string()),
            ClientError::Format(msg) => SubmissionError::MalformedPayload(msg),
            other => SubmissionError::Transport(other.to_string()),
        }
    }
}

/// Envelope validation failures from `AnalyzeResponse`. The message is
/// carried bare so converting back does not repeat the prefix.
impl From<SubmissionError> for ClientError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::MalformedPayload(msg) => ClientError::Format(msg),
            SubmissionError::Server { status, message } => ClientError::Server { status, message },
            other => ClientError::Format(other.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// The `error` message from a non-success body, or the raw body when it
/// does not follow the `{ "error": ... }` contract.
pub fn server_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error message".to_string()
    } else {
        trimmed.to_string()
    }
}
