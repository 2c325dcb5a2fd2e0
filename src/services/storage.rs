//! Local media storage for uploaded images and documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use uuid::Uuid;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "svg"];
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];
pub const ANY_EXTENSION: &[&str] = &[];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file type .{0} is not allowed")]
    Extension(String),

    #[error("file is too large (max {max} bytes)")]
    TooLarge { max: usize },

    #[error("file is empty")]
    Empty,

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Client mistakes as opposed to server failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// A fully buffered multipart body: text parts by name, file parts by name.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, StorageError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| StorageError::Multipart(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| StorageError::Multipart(e.to_string()))?;

            match file_name {
                Some(file_name) => {
                    // browsers send an empty part for untouched file inputs
                    if !bytes.is_empty() || !file_name.is_empty() {
                        form.files.insert(name, UploadedFile { file_name: Some(file_name), bytes });
                    }
                }
                None => {
                    form.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.text(name).map(parse_flag)
    }
}

pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl MediaStorage {
    pub fn new(root: PathBuf, base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root,
            base_url: base_url.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn check(&self, file: &UploadedFile, allowed: &[&str]) -> Result<String, StorageError> {
        if file.bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if file.bytes.len() > self.max_bytes {
            return Err(StorageError::TooLarge { max: self.max_bytes });
        }
        let ext = file.extension().unwrap_or_else(|| "bin".to_string());
        if !allowed.is_empty() && !allowed.contains(&ext.as_str()) {
            return Err(StorageError::Extension(ext));
        }
        Ok(ext)
    }

    /// Writes the file under `folder` with a random name and returns the relative path.
    pub async fn save(&self, folder: &str, file: &UploadedFile, allowed: &[&str]) -> Result<String, StorageError> {
        let ext = self.check(file, allowed)?;
        let relative = format!("{}/{}.{}", folder.trim_matches('/'), Uuid::new_v4(), ext);
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &file.bytes).await?;

        tracing::debug!(path = %relative, size = file.bytes.len(), "stored upload");
        Ok(relative)
    }

    pub async fn remove(&self, relative: &str) {
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            tracing::warn!(path = %relative, error = %e, "failed to remove stored file");
        }
    }

    pub fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), relative.trim_start_matches('/'))
    }

    pub fn url_opt(&self, relative: Option<&str>) -> Option<String> {
        relative.filter(|r| !r.is_empty()).map(|r| self.url(r))
    }
}
