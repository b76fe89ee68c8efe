//! Asset pipeline: optimize a selected file, upload it, hand back a durable
//! reference. Deletions of replaced objects wait until the owning form submits.

pub mod local;
pub mod optimize;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::gateway::{GatewayError, ObjectStorage, StoredObject};
pub use optimize::{fit_within, optimize, OptimizeOptions, Optimized};

/// Storage folder for dish photos
pub const DISH_FOLDER: &str = "dishes";
/// Storage folder for storefront logos
pub const LOGO_FOLDER: &str = "website-icons";
/// Storage folder for storefront section images
pub const SITE_FOLDER: &str = "website-builder";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("upload of {name} failed: {source}")]
    Upload { name: String, source: GatewayError },

    #[error("delete of {path} failed: {source}")]
    Delete { path: String, source: GatewayError },

    #[error("could not read {path}: {source}")]
    Read { path: String, source: std::io::Error },
}

/// A locally selected file that has not been uploaded yet
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFile {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub name: String,
}

impl std::fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl PendingFile {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            name: name.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_for_name(&name).to_string();
        Ok(Self { bytes, mime, name })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Lowercased extension of the original name, `bin` when there is none
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Content type from a file name's extension
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// An image-valued field: either a local file awaiting upload or a durable URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AssetField {
    Pending(PendingFile),
    Resolved(String),
}

impl AssetField {
    pub fn is_pending(&self) -> bool {
        matches!(self, AssetField::Pending(_))
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            AssetField::Resolved(url) => Some(url),
            AssetField::Pending(_) => None,
        }
    }

    /// True for an empty durable reference
    pub fn is_blank(&self) -> bool {
        matches!(self, AssetField::Resolved(url) if url.trim().is_empty())
    }
}

impl From<String> for AssetField {
    fn from(url: String) -> Self {
        AssetField::Resolved(url)
    }
}

/// Where a resolved field now lives. `path` is known only for objects this
/// pipeline uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurableRef {
    pub url: String,
    pub path: Option<String>,
}

impl From<StoredObject> for DurableRef {
    fn from(obj: StoredObject) -> Self {
        Self {
            url: obj.url,
            path: Some(obj.path),
        }
    }
}

/// A non-fatal failure shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub message: String,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

impl From<&AssetError> for Notice {
    fn from(err: &AssetError) -> Self {
        let subject = match err {
            AssetError::Upload { name, .. } => name.clone(),
            AssetError::Delete { path, .. } | AssetError::Read { path, .. } => path.clone(),
        };
        Notice {
            subject,
            message: err.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AssetPipeline {
    storage: Arc<dyn ObjectStorage>,
    options: OptimizeOptions,
}

impl AssetPipeline {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            storage,
            options: OptimizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OptimizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Durable references pass through without touching storage
    pub async fn resolve(&self, field: &AssetField, folder: &str) -> Result<DurableRef, AssetError> {
        match field {
            AssetField::Resolved(url) => Ok(DurableRef {
                url: url.clone(),
                path: None,
            }),
            AssetField::Pending(file) => self.upload(file, folder).await.map(DurableRef::from),
        }
    }

    pub async fn upload(&self, file: &PendingFile, folder: &str) -> Result<StoredObject, AssetError> {
        let optimized = optimize(file, &self.options);
        let path = format!("{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), optimized.extension);

        let stored = self
            .storage
            .upload(optimized.bytes, &path, &optimized.mime)
            .await
            .map_err(|source| {
                warn!("Upload of {} failed: {}", file.name, source);
                AssetError::Upload {
                    name: file.name.clone(),
                    source,
                }
            })?;

        info!("Uploaded {} to {}", file.name, stored.path);
        Ok(stored)
    }

    pub async fn delete(&self, path: &str) -> Result<(), AssetError> {
        self.storage.delete(path).await.map_err(|source| {
            warn!("Delete of {} failed: {}", path, source);
            AssetError::Delete {
                path: path.to_string(),
                source,
            }
        })
    }
}

/// Storage paths to remove once the surrounding form submits.
///
/// Dropping or discarding the queue leaves every object in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeferredDeletions {
    paths: Vec<String>,
}

impl DeferredDeletions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !path.is_empty() && !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn pending(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn discard(&mut self) {
        self.paths.clear();
    }

    /// Issues every scheduled delete; failures come back as notices
    pub async fn flush(&mut self, pipeline: &AssetPipeline) -> Vec<Notice> {
        let mut notices = Vec::new();
        for path in self.paths.drain(..) {
            if let Err(e) = pipeline.delete(&path).await {
                notices.push(Notice::from(&e));
            }
        }
        notices
    }
}
