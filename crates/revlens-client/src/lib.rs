//! Backend access: request types, the `Backend` trait, the reqwest-based
//! client, and the submission workflow that feeds a `Session`.

pub mod backend;
mod error;
pub mod submit;

#[cfg(feature = "http")]
pub mod http;

pub use backend::{Backend, ColumnHints, FileSubmission, Submission, TextSubmission};
pub use error::{ClientError, server_message};
pub use submit::{SubmissionRequest, submit};

#[cfg(feature = "http")]
pub use http::{ClassifierClient, DEFAULT_BASE_URL, Health};
