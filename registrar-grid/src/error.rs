//! Error types for the grid.
//!
//! Two families live here. [`GridError`] reports caller misuse (unknown filter
//! fields, page sizes outside the allowed set) and is returned synchronously
//! from setters. [`GridFailure`] is the reason a grid is in the `Errored`
//! state; it is stored, rendered, and never returned to the renderer as a raw
//! error.

use thiserror::Error;

/// A payload that matched none of the recognized response shapes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedResponse {
    #[error("unrecognized response shape (top-level keys: {keys})")]
    UnrecognizedShape { keys: String },

    #[error("row {index} could not be decoded: {reason}")]
    RowDecode { index: usize, reason: String },
}

/// Failures reported by a [`RemoteDataSource`](crate::source::RemoteDataSource).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network or timeout failure. Safe to retry with the same key.
    #[error("network error: {0}")]
    Transient(String),

    /// The server answered with a 4xx/5xx status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl FetchError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

/// Why a grid entered the `Errored` state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridFailure {
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),

    #[error("network error: {message}")]
    Transient { message: String },

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl GridFailure {
    /// Whether re-issuing the same query can be expected to help.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GridFailure::Transient { .. })
    }

    /// Message shown inline in the grid body.
    pub fn display_message(&self) -> String {
        match self {
            GridFailure::Malformed(_) => crate::render::NO_DATA.to_string(),
            GridFailure::Transient { message } => format!("Network error: {}", message),
            GridFailure::Rejected { message, .. } => message.clone(),
        }
    }
}

impl From<FetchError> for GridFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transient(message) => GridFailure::Transient { message },
            FetchError::Rejected { status, message } => GridFailure::Rejected { status, message },
        }
    }
}

/// Caller misuse of the grid controllers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("unknown filter field: {field}")]
    UnknownFilter { field: String },

    #[error("page size {size} is not one of {allowed:?}")]
    PageSizeNotAllowed { size: u32, allowed: Vec<u32> },

    #[error("value {value:?} is not an option of filter {field}")]
    InvalidOption { field: String, value: String },

    #[error("invalid grid spec: {reason}")]
    InvalidSpec { reason: String },
}

pub type GridResult<T> = Result<T, GridError>;
