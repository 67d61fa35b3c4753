use async_trait::async_trait;

use crate::error::SubmissionError;
use crate::submission::types::{CreatedProperty, SubmissionPayload};

/// The backend endpoint that creates a property from one multipart request.
/// Implemented over HTTP by `HttpPropertyApi`; tests use in-memory fakes.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    /// Create the property. Exactly one request per call, no retries.
    async fn create_property(
        &self,
        payload: SubmissionPayload,
        bearer_token: &str,
    ) -> Result<CreatedProperty, SubmissionError>;

    /// Name of the backend, for logs
    fn api_name(&self) -> &'static str;
}

/// The external authentication collaborator
pub trait AuthContext {
    /// Current bearer credential, if the user is signed in
    fn bearer_token(&self) -> Option<String>;

    /// Called when the server refused the credential
    fn request_reauthentication(&self);
}
