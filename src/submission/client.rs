use std::cell::Cell;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::WizardConfig;
use crate::error::SubmissionError;
use crate::submission::traits::{AuthContext, PropertyApi};
use crate::submission::types::{CreatedProperty, SubmissionPayload};

/// Property creation over the backend's REST API
pub struct HttpPropertyApi {
    client: Client,
    base_url: String,
}

impl HttpPropertyApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("property-wizard/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &WizardConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    fn endpoint(&self) -> String {
        format!("{}/properties", self.base_url.trim_end_matches('/'))
    }

    fn build_form(payload: SubmissionPayload) -> Result<Form, SubmissionError> {
        let fields = payload
            .form_fields()
            .map_err(|e| SubmissionError::Transport {
                detail: format!("failed to encode form: {e}"),
            })?;

        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        for image in payload.images {
            let part = Part::bytes(image.data.to_vec())
                .file_name(image.file_name)
                .mime_str(image.content_type)
                .map_err(|e| SubmissionError::Transport {
                    detail: e.to_string(),
                })?;
            form = form.part("images", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl PropertyApi for HttpPropertyApi {
    #[tracing::instrument(skip_all, fields(images = payload.images.len()))]
    async fn create_property(
        &self,
        payload: SubmissionPayload,
        bearer_token: &str,
    ) -> Result<CreatedProperty, SubmissionError> {
        let url = self.endpoint();
        debug!("Posting property to {}", url);

        let form = Self::build_form(payload)?;
        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Property request failed: {}", e);
                SubmissionError::Transport {
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read backend response: {}", e);
            SubmissionError::Transport {
                detail: e.to_string(),
            }
        })?;
        debug!("Backend answered {} with {} bytes", status, body.len());

        if !status.is_success() {
            warn!("Backend returned status: {}", status);
            return Err(SubmissionError::Status {
                status: status.as_u16(),
                message: parse_error_message(&body),
            });
        }

        let id = parse_created_id(&body).ok_or(SubmissionError::MissingPropertyId)?;
        info!("Backend created property {}", id);
        Ok(CreatedProperty { id })
    }

    fn api_name(&self) -> &'static str {
        "property API"
    }
}

/// Credential handed over by the sign-in flow, fixed for the process lifetime
#[derive(Debug, Default)]
pub struct StaticToken {
    token: Option<String>,
    reauthentication_requested: Cell<bool>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
            reauthentication_requested: Cell::new(false),
        }
    }

    pub fn reauthentication_requested(&self) -> bool {
        self.reauthentication_requested.get()
    }
}

impl AuthContext for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn request_reauthentication(&self) {
        warn!("Credential rejected, sign in again to continue");
        self.reauthentication_requested.set(true);
    }
}

const ID_KEYS: [&str; 3] = ["id", "_id", "propertyId"];
const MESSAGE_KEYS: [&str; 3] = ["message", "error", "msg"];

/// Created property id from a success body: `id`, `_id` or `propertyId`, at
/// the top level or under `data`
pub(crate) fn parse_created_id(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    find_string(&json, &ID_KEYS, true)
        .or_else(|| json.get("data").and_then(|data| find_string(data, &ID_KEYS, true)))
}

/// Human readable message from an error body, JSON or plain text
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => find_string(&json, &MESSAGE_KEYS, false).or_else(|| {
            json.get("data")
                .and_then(|data| find_string(data, &MESSAGE_KEYS, false))
        }),
        Err(_) if !trimmed.starts_with('<') && trimmed.len() <= 300 => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

fn find_string(json: &Value, keys: &[&str], allow_numbers: bool) -> Option<String> {
    keys.iter().find_map(|key| match json.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if allow_numbers => Some(n.to_string()),
        _ => None,
    })
}
