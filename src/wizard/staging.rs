use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StagingError;

/// Image formats accepted by the property backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the file signature
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// A file picked by the user
#[derive(Debug, Clone)]
pub enum ImageSelection {
    /// A file on disk, read when staged
    Path(PathBuf),
    /// Bytes already in memory (drag and drop, clipboard)
    Bytes { file_name: String, data: Vec<u8> },
}

impl ImageSelection {
    fn display_name(&self) -> String {
        match self {
            ImageSelection::Path(path) => file_name_of(path),
            ImageSelection::Bytes { file_name, .. } => file_name.clone(),
        }
    }
}

/// Opaque handle to the bytes behind a staged image
#[derive(Debug, Clone)]
pub struct SourceHandle {
    file_name: String,
    format: ImageFormat,
    data: Arc<[u8]>,
    path: Option<PathBuf>,
}

impl SourceHandle {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Path the image was read from, if it came from disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Tracks preview URLs that are currently live for one staging session
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Rc<RefCell<HashSet<String>>>,
}

impl PreviewRegistry {
    fn issue(&self) -> PreviewLease {
        let url = format!("blob:property-wizard/{}", Uuid::new_v4());
        self.live.borrow_mut().insert(url.clone());
        PreviewLease {
            url,
            registry: self.clone(),
        }
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.borrow().contains(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }
}

/// A preview URL that is revoked when dropped
#[derive(Debug)]
pub struct PreviewLease {
    url: String,
    registry: PreviewRegistry,
}

impl PreviewLease {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewLease {
    fn drop(&mut self) {
        self.registry.live.borrow_mut().remove(&self.url);
        debug!(url = %self.url, "revoked image preview");
    }
}

/// An image selected for the property but not uploaded yet
#[derive(Debug)]
pub struct StagedImage {
    client_id: String,
    preview: PreviewLease,
    source: SourceHandle,
}

impl StagedImage {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn file_name(&self) -> &str {
        self.source.file_name()
    }
}

/// Path-backed staged image as stored with the wizard snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedImage {
    pub client_id: String,
    pub path: PathBuf,
}

/// Outcome of staging a batch of files
#[derive(Debug, Default)]
pub struct StagingReport {
    pub added: Vec<String>,
    pub rejected: Vec<StagingError>,
}

/// Ordered set of staged images. The first one is the cover.
#[derive(Debug)]
pub struct ImageStagingArea {
    images: Vec<StagedImage>,
    registry: PreviewRegistry,
    max_image_bytes: u64,
}

impl ImageStagingArea {
    pub fn new(max_image_bytes: u64) -> Self {
        Self {
            images: Vec::new(),
            registry: PreviewRegistry::default(),
            max_image_bytes,
        }
    }

    pub fn images(&self) -> &[StagedImage] {
        &self.images
    }

    pub fn cover(&self) -> Option<&StagedImage> {
        self.images.first()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn registry(&self) -> &PreviewRegistry {
        &self.registry
    }

    pub fn get(&self, client_id: &str) -> Option<&StagedImage> {
        self.images.iter().find(|image| image.client_id == client_id)
    }

    /// Stage every readable image in `files`. Files that fail are reported
    /// individually and do not affect the rest of the batch.
    pub fn add_images(&mut self, files: impl IntoIterator<Item = ImageSelection>) -> StagingReport {
        let mut report = StagingReport::default();
        for selection in files {
            match self.stage(selection, None) {
                Ok(client_id) => report.added.push(client_id),
                Err(e) => {
                    warn!("Rejected image: {}", e);
                    report.rejected.push(e);
                }
            }
        }
        if !report.added.is_empty() {
            info!("Staged {} image(s), {} total", report.added.len(), self.images.len());
        }
        report
    }

    /// Remove an image and revoke its preview. Unknown ids are ignored.
    pub fn remove_image(&mut self, client_id: &str) -> bool {
        match self.images.iter().position(|image| image.client_id == client_id) {
            Some(index) => {
                self.images.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move an image to `new_index`, clamped to the end. Unknown ids are ignored.
    pub fn reorder(&mut self, client_id: &str, new_index: usize) -> bool {
        let Some(index) = self.images.iter().position(|image| image.client_id == client_id) else {
            return false;
        };
        let image = self.images.remove(index);
        let new_index = new_index.min(self.images.len());
        self.images.insert(new_index, image);
        true
    }

    /// Drop every staged image, revoking all previews
    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn persisted(&self) -> Vec<PersistedImage> {
        self.images
            .iter()
            .filter_map(|image| {
                image.source.path().map(|path| PersistedImage {
                    client_id: image.client_id.clone(),
                    path: path.to_path_buf(),
                })
            })
            .collect()
    }

    /// Re-stage images saved with a previous session, keeping their ids
    pub fn restore(&mut self, persisted: Vec<PersistedImage>) -> StagingReport {
        let mut report = StagingReport::default();
        for entry in persisted {
            match self.stage(ImageSelection::Path(entry.path), Some(entry.client_id)) {
                Ok(client_id) => report.added.push(client_id),
                Err(e) => {
                    warn!("Dropped previously staged image: {}", e);
                    report.rejected.push(e);
                }
            }
        }
        report
    }

    fn stage(
        &mut self,
        selection: ImageSelection,
        client_id: Option<String>,
    ) -> Result<String, StagingError> {
        let name = selection.display_name();
        let (data, path) = match selection {
            ImageSelection::Path(path) => {
                let path =
                    std::path::absolute(&path).map_err(|source| StagingError::Unreadable {
                        path: path.clone(),
                        source,
                    })?;
                let size = std::fs::metadata(&path)
                    .map_err(|source| StagingError::Unreadable {
                        path: path.clone(),
                        source,
                    })?
                    .len();
                self.check_size(&name, size)?;
                let data = std::fs::read(&path).map_err(|source| StagingError::Unreadable {
                    path: path.clone(),
                    source,
                })?;
                (data, Some(path))
            }
            ImageSelection::Bytes { data, .. } => (data, None),
        };

        if data.is_empty() {
            return Err(StagingError::Empty { name });
        }
        self.check_size(&name, data.len() as u64)?;
        let format = ImageFormat::sniff(&data)
            .ok_or_else(|| StagingError::UnsupportedFormat { name: name.clone() })?;

        let client_id = client_id
            .filter(|id| self.get(id).is_none())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let image = StagedImage {
            client_id: client_id.clone(),
            preview: self.registry.issue(),
            source: SourceHandle {
                file_name: name,
                format,
                data: data.into(),
                path,
            },
        };
        debug!(client_id = %image.client_id, bytes = image.source.len(), "staged image");
        self.images.push(image);
        Ok(client_id)
    }

    fn check_size(&self, name: &str, size: u64) -> Result<(), StagingError> {
        if size > self.max_image_bytes {
            return Err(StagingError::TooLarge {
                name: name.to_string(),
                size,
                limit: self.max_image_bytes,
            });
        }
        Ok(())
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
