//! Error types for selection validation and backend access.

use crate::models::NoDataReason;
use thiserror::Error;

/// Failure while fetching or decoding a comparison payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to backend at {0}")]
    Connect(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Maps the error onto the single user-visible no-data state.
    pub fn into_no_data(self) -> NoDataReason {
        match self {
            FetchError::Malformed(msg) => NoDataReason::Malformed(msg),
            other => NoDataReason::Transport(other.to_string()),
        }
    }
}

/// Invalid project selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("select between {min} and {max} projects to compare (got {got})")]
    WrongCount { min: usize, max: usize, got: usize },

    #[error("project key must not be empty")]
    EmptyKey,

    #[error("project {0} is selected twice")]
    Duplicate(String),
}
