use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::PropertyDraft;
use crate::wizard::navigation::WizardPosition;
use crate::wizard::staging::PersistedImage;

/// Current on-disk snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized wizard state for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub version: u32,
    pub session_key: String,
    pub saved_at: DateTime<Utc>,
    pub draft: PropertyDraft,
    pub position: WizardPosition,
    #[serde(default)]
    pub staged_images: Vec<PersistedImage>,
}

/// File-backed store for a single session's snapshot
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(data_dir: &Path, session_key: &str) -> Self {
        let file_name = format!("{}.json", sanitize_key(session_key));
        Self {
            path: data_dir.join("sessions").join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved snapshot, if any. Snapshots written by an unknown format
    /// version are ignored.
    pub async fn load(&self) -> Result<Option<WizardSnapshot>, StoreError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved wizard state");
                return Ok(None);
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let value: serde_json::Value =
            serde_json::from_str(&json).map_err(|source| self.corrupt(source))?;
        let version = value.get("version").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(SNAPSHOT_VERSION)) {
            warn!(
                "Ignoring wizard state with unsupported version {:?} at {}",
                version,
                self.path.display()
            );
            return Ok(None);
        }

        let snapshot: WizardSnapshot =
            serde_json::from_value(value).map_err(|source| self.corrupt(source))?;

        info!("Restored wizard state saved at {}", snapshot.saved_at);
        Ok(Some(snapshot))
    }

    /// Like [`DraftStore::load`], but a corrupt snapshot is logged and
    /// treated as absent so the session can start over
    pub async fn load_or_discard(&self) -> Result<Option<WizardSnapshot>, StoreError> {
        match self.load().await {
            Err(e @ StoreError::Corrupt { .. }) => {
                warn!("Discarding unreadable wizard state: {}", e);
                Ok(None)
            }
            other => other,
        }
    }

    /// Write the snapshot through a temporary file so a crash never leaves a
    /// half-written state behind
    pub async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let json = serde_json::to_string_pretty(snapshot).map_err(|source| self.corrupt(source))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), "saved wizard state");
        Ok(())
    }

    /// Forget the saved snapshot. Missing files are not an error.
    pub async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Cleared saved wizard state");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn corrupt(&self, source: serde_json::Error) -> StoreError {
        StoreError::Corrupt {
            path: self.path.clone(),
            source,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::StepId;

    fn snapshot(session_key: &str) -> WizardSnapshot {
        WizardSnapshot {
            version: SNAPSHOT_VERSION,
            session_key: session_key.to_string(),
            saved_at: Utc::now(),
            draft: PropertyDraft {
                category: Some("Industrial".into()),
                title: "Harbour warehouse".into(),
                ..Default::default()
            },
            position: WizardPosition {
                current_step: StepId::SubCategory,
                steps: StepId::ALL.to_vec(),
                unlocked: vec![StepId::Category, StepId::SubCategory],
            },
            staged_images: Vec::new(),
        }
    }

    #[test]
    fn session_keys_are_sanitized() {
        assert_eq!(sanitize_key("user-42/../etc"), "user-42____etc");
        assert_eq!(sanitize_key(""), "default");
    }

    #[tokio::test]
    async fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path(), "manager-7");
        assert!(store.load().await.unwrap().is_none());

        let saved = snapshot("manager-7");
        store.save(&saved).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(saved));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_version_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path(), "default");
        let mut saved = snapshot("default");
        saved.version = SNAPSHOT_VERSION + 1;
        store.save(&saved).await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path(), "default");
        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(store.path(), "{ not json").await.unwrap();
        assert!(matches!(store.load().await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn future_version_with_new_shape_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path(), "default");
        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(store.path(), r#"{"version":2,"sessionKey":"default","draftV2":{}}"#)
            .await
            .unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_state_can_be_discarded_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path(), "default");
        tokio::fs::create_dir_all(store.path().parent().unwrap()).await.unwrap();
        tokio::fs::write(store.path(), "{ not json").await.unwrap();

        assert!(store.load_or_discard().await.unwrap().is_none());
        assert!(store.path().exists());

        store.clear().await.unwrap();
        assert!(!store.path().exists());
    }
}
