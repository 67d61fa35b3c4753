pub mod client;
pub mod pipeline;
pub mod traits;
pub mod types;

pub use client::{HttpPropertyApi, StaticToken};
pub use pipeline::{PendingSubmission, SubmissionOutcome, SubmissionPipeline};
pub use traits::{AuthContext, PropertyApi};
pub use types::{
    CreatedProperty, FailureKind, ImagePart, SubmissionFailure, SubmissionPayload, SubmissionState,
    GENERIC_FAILURE_MESSAGE, INCOMPLETE_MESSAGE,
};
