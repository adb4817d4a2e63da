use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use crate::error::{Error, Result};

const ALLOWED_EXTENSIONS: [&str; 9] = ["pdf", "doc", "docx", "txt", "rtf", "jpg", "jpeg", "png", "webp"];

/// Storage for uploaded crew documents, addressed by opaque references.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store(&self, filename: &str, data: Bytes) -> Result<String>;
    async fn retrieve(&self, reference: &str) -> Result<Bytes>;
    async fn remove(&self, reference: &str) -> Result<()>;
}

pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let rel = Path::new(reference);
        let safe = !reference.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(Error::NotFound("Document file not found".into()));
        }
        Ok(self.root.join(rel))
    }
}

fn checked_extension(filename: &str, data: &[u8]) -> Result<String> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!("File type .{} is not allowed", ext)));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::BadRequest("Invalid JPEG file content".into()));
    }
    if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Err(Error::BadRequest("Invalid PNG file content".into()));
    }
    Ok(ext)
}

#[async_trait]
impl FileStore for DiskFileStore {
    async fn store(&self, filename: &str, data: Bytes) -> Result<String> {
        let ext = checked_extension(filename, &data)?;
        let dir = self.root.join("crew");
        fs::create_dir_all(&dir).await?;

        let reference = format!("crew/{}.{}", uuid::Uuid::new_v4(), ext);
        fs::write(self.root.join(&reference), &data).await.map_err(|e| {
            tracing::error!("Failed to write document file: {}", e);
            Error::Unavailable(format!("Failed to save file: {}", e))
        })?;
        Ok(reference)
    }

    async fn retrieve(&self, reference: &str) -> Result<Bytes> {
        let path = self.resolve(reference)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound("Document file not found".into()))
            }
            Err(e) => {
                tracing::error!("Failed to read document {}: {}", reference, e);
                Err(Error::Unavailable("Document storage is unavailable".into()))
            }
        }
    }

    async fn remove(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
