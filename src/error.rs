use std::path::PathBuf;

use thiserror::Error;

use crate::models::{CategoryId, SubCategoryId};
use crate::submission::FailureKind;
use crate::wizard::StepId;

/// Why a navigation request was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{} is incomplete: {reason}", .step.title())]
    Blocked { step: StepId, reason: String },

    #[error("{} does not apply to this property", .0.title())]
    NotApplicable(StepId),

    #[error("this is the last step, submit the property to finish")]
    NoNextStep,
}

/// Why an edit to the draft was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("{} can only be edited on its own step (current step: {})", .requested.title(), .active.title())]
    InactiveStep { active: StepId, requested: StepId },

    #[error("unknown category: {0}")]
    UnknownCategory(CategoryId),

    #[error("choose a category before picking a subcategory")]
    NoCategorySelected,

    #[error("{sub} is not a subcategory of {category}")]
    UnknownSubCategory {
        category: CategoryId,
        sub: SubCategoryId,
    },

    #[error("coordinates out of range: lat {lat}, lng {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
}

/// A selected file that could not be staged
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} is empty")]
    Empty { name: String },

    #[error("{name} is {size} bytes, above the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },

    #[error("{name} is not a supported image (JPEG, PNG, GIF or WebP)")]
    UnsupportedFormat { name: String },
}

/// Failure reported by the property creation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("network error: {detail}")]
    Transport { detail: String },

    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("no credential available")]
    MissingCredential,

    #[error("response did not include a property id")]
    MissingPropertyId,
}

impl SubmissionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SubmissionError::Transport { .. } => FailureKind::Transient,
            SubmissionError::Status { status, .. } => match *status {
                401 | 403 => FailureKind::Unauthorized,
                408 | 429 | 502 | 503 | 504 => FailureKind::Transient,
                _ => FailureKind::Rejected,
            },
            SubmissionError::MissingCredential => FailureKind::Unauthorized,
            SubmissionError::MissingPropertyId => FailureKind::Rejected,
        }
    }

    /// Human readable message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            SubmissionError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Persisted wizard state could not be read or written
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access wizard state at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wizard state at {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
