use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

/// Prefix of environment variables overriding configuration keys
pub const ENV_PREFIX: &str = "PROPERTY_WIZARD";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_SESSION_KEY: &str = "default";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Runtime settings for the wizard
#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    /// Base URL of the property backend, without the `/properties` suffix
    pub api_base_url: String,
    /// Bearer credential issued by the sign-in flow
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Key under which the wizard state is persisted
    pub session_key: String,
    /// Where wizard sessions are saved
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    /// Largest single image accepted for staging
    pub max_image_bytes: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            data_dir: default_data_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl WizardConfig {
    /// Defaults, then `config.toml` in the config directory, then
    /// `PROPERTY_WIZARD_*` environment variables
    pub fn load() -> Result<Self> {
        let config_file = default_config_dir().join("config.toml");
        debug!("Looking for configuration in {}", config_file.display());
        Self::load_from(config::File::from(config_file).required(false))
    }

    fn load_from<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        let config = config::Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("session_key", defaults.session_key)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("max_image_bytes", defaults.max_image_bytes as i64)?
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "property-manager", "property-wizard")
}

pub fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

pub fn default_config_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}
