use tracing::{debug, info, warn};

use crate::error::SubmissionError;
use crate::submission::traits::{AuthContext, PropertyApi};
use crate::submission::types::{
    CreatedProperty, FailureKind, ImagePart, SubmissionFailure, SubmissionPayload,
    SubmissionState, GENERIC_FAILURE_MESSAGE, INCOMPLETE_MESSAGE,
};
use crate::wizard::DraftView;

const SIGN_IN_AGAIN_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// A request that has been started but not sent yet
#[derive(Debug)]
pub struct PendingSubmission {
    attempt: u64,
    payload: SubmissionPayload,
    bearer_token: String,
}

impl PendingSubmission {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }

    /// Send the request. The payload is owned, so the wizard may keep being
    /// used while this future is pending.
    pub async fn send(self, api: &dyn PropertyApi) -> SubmissionOutcome {
        info!(
            "Submitting property to {} ({} image(s), {} bytes)",
            api.api_name(),
            self.payload.images.len(),
            self.payload.total_image_bytes()
        );
        let result = api.create_property(self.payload, &self.bearer_token).await;
        SubmissionOutcome {
            attempt: self.attempt,
            result,
        }
    }
}

/// Resolved result of one attempt
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub attempt: u64,
    pub result: Result<CreatedProperty, SubmissionError>,
}

/// Tracks the state of property creation for one wizard session.
///
/// [`begin`](Self::begin) checks the draft and builds the payload,
/// [`PendingSubmission::send`] performs the request without touching the
/// wizard, and [`apply`](Self::apply) records the outcome.
#[derive(Debug, Default)]
pub struct SubmissionPipeline {
    state: SubmissionState,
    attempts: u64,
}

impl SubmissionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Start an attempt. Returns `None` when nothing should be sent: another
    /// attempt is in flight (state untouched), the draft is incomplete, or no
    /// credential is available (state set to `Failed`).
    pub fn begin(
        &mut self,
        view: &DraftView<'_>,
        auth: &dyn AuthContext,
    ) -> Option<PendingSubmission> {
        if self.state.is_in_flight() {
            debug!("submission already in flight, ignoring");
            return None;
        }

        let incomplete = view
            .effective_steps()
            .into_iter()
            .find(|step| !step.is_satisfied(view));
        let payload = match (incomplete, build_payload(view)) {
            (None, Some(payload)) => payload,
            (step, _) => {
                if let Some(step) = step {
                    info!("Not submitting: {} is incomplete", step.title());
                }
                self.fail(FailureKind::Incomplete, INCOMPLETE_MESSAGE.to_string());
                return None;
            }
        };

        let Some(bearer_token) = auth.bearer_token() else {
            let error = SubmissionError::MissingCredential;
            warn!("Not submitting: {}", error);
            self.record_failure(&error, auth);
            return None;
        };

        self.attempts += 1;
        self.state = SubmissionState::InFlight;
        Some(PendingSubmission {
            attempt: self.attempts,
            payload,
            bearer_token,
        })
    }

    /// Record the outcome of an attempt, whenever it resolves
    pub fn apply(&mut self, outcome: SubmissionOutcome, auth: &dyn AuthContext) -> &SubmissionState {
        match outcome.result {
            Ok(created) => {
                info!("✅ Property created with id {}", created.id);
                self.state = SubmissionState::Succeeded(created.id);
            }
            Err(e) => {
                warn!("Submission attempt {} failed: {}", outcome.attempt, e);
                self.record_failure(&e, auth);
            }
        }
        &self.state
    }

    fn record_failure(&mut self, error: &SubmissionError, auth: &dyn AuthContext) {
        let kind = error.kind();
        if kind == FailureKind::Unauthorized {
            auth.request_reauthentication();
        }
        let message = match (error.server_message(), kind) {
            (Some(message), _) => message.to_string(),
            (None, FailureKind::Unauthorized) => SIGN_IN_AGAIN_MESSAGE.to_string(),
            (None, _) => GENERIC_FAILURE_MESSAGE.to_string(),
        };
        self.fail(kind, message);
    }

    /// Forget the last result. An in-flight attempt keeps its marker until it
    /// resolves so a second request cannot start alongside it.
    pub fn reset(&mut self) {
        if !self.state.is_in_flight() {
            self.state = SubmissionState::Idle;
        }
    }

    fn fail(&mut self, kind: FailureKind, message: String) {
        self.state = SubmissionState::Failed(SubmissionFailure { kind, message });
    }
}

fn build_payload(view: &DraftView<'_>) -> Option<SubmissionPayload> {
    let draft = view.draft;
    let category = draft.category.as_ref()?;
    Some(SubmissionPayload {
        category: category.to_string(),
        sub_category: draft.sub_category.as_ref().map(ToString::to_string),
        title: draft.title.trim().to_string(),
        description: draft.description.trim().to_string(),
        structural_units: draft.structural_units.to_map(),
        location: draft.location.clone(),
        images: view
            .images
            .iter()
            .map(|image| ImagePart {
                client_id: image.client_id().to_string(),
                file_name: image.file_name().to_string(),
                content_type: image.source().content_type(),
                data: image.source().data(),
            })
            .collect(),
    })
}
