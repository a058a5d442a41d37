//! Error types shared across the portal client.

use thiserror::Error;

/// Errors raised while resolving categories against the flat category list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category not found for {root:?} / {subcategory:?}")]
    NotFound {
        root: String,
        subcategory: Option<String>,
    },
    #[error("category name {0:?} is used by more than one category")]
    DuplicateName(String),
}

/// Errors raised by form validation before any request is sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("unknown difficulty {0:?}")]
    UnknownDifficulty(String),
    #[error("test must contain at least one question")]
    EmptySelection,
    #[error(transparent)]
    Category(#[from] CategoryError),
}

/// Errors raised by the assessment session state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("test has no questions")]
    Empty,
    #[error("question index {0} is out of range")]
    OutOfRange(usize),
    #[error("option {0:?} does not exist for this question")]
    UnknownOption(String),
    #[error("action not allowed while in {0} view")]
    WrongView(&'static str),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("no submission is in flight")]
    NoSubmission,
}

/// Errors returned by the REST client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("session expired, please sign in again")]
    Unauthorized,
    #[error("request failed with status {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// The message the backend attached to the failure, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Errors raised while submitting a finished session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors raised while reading or writing the bulk import CSV.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("no valid data found in CSV")]
    NoRows,
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by candidate identity handoff storage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HandoffError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
