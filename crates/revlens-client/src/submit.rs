//! Submission workflow: the one place backend failures are recovered.
//!
//! Whatever happens (no input, transport error, error status, malformed
//! body) the session ends up with either a fresh batch or an empty batch and
//! a retained error. Nothing here is cancelled or de-duplicated; a later
//! response simply replaces an earlier one.

use revlens_core::{Session, SessionEvent, SubmissionError};
use tracing::{info, warn};

use crate::backend::{Backend, FileSubmission, Submission, TextSubmission};

/// What the operator filled in: pasted text, a chosen file, or both.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub text: Option<TextSubmission>,
    pub file: Option<FileSubmission>,
}

impl SubmissionRequest {
    /// A chosen file takes precedence over pasted text; blank text is no input.
    pub fn resolve(self) -> Result<Submission, SubmissionError> {
        if let Some(file) = self.file {
            return Ok(Submission::File(file));
        }
        match self.text {
            Some(text) if !text.is_blank() => Ok(Submission::Text(text)),
            _ => Err(SubmissionError::NoInput),
        }
    }
}

/// Send a request and fold the outcome into `session`.
///
/// Returns the number of results loaded, or the error now held by the session.
pub async fn submit<B>(
    backend: &B,
    session: &mut Session,
    request: SubmissionRequest,
) -> Result<usize, SubmissionError>
where
    B: Backend + ?Sized,
{
    let submission = match request.resolve() {
        Ok(s) => s,
        Err(err) => {
            session.apply(SessionEvent::BatchFailed(err.clone()));
            return Err(err);
        }
    };

    let source = submission.source();
    session.apply(SessionEvent::SubmissionStarted);
    info!(source = ?source, "submitting to classification backend");

    match backend.analyze(&submission).await {
        Ok(response) => {
            let count = response.results.len();
            session.apply(SessionEvent::BatchLoaded {
                results: response.results,
                source,
            });
            Ok(count)
        }
        Err(err) => {
            let err = SubmissionError::from(err);
            warn!(error = %err, "submission failed");
            session.apply(SessionEvent::BatchFailed(err.clone()));
            Err(err)
        }
    }
}
