//! Attachment storage backends.
//!
//! [`StorageBackend`] abstracts over where attachment bytes live. The API
//! server uses [`FilesystemBackend`] behind a static file route; deployments
//! with an object-storage service use [`HttpObjectStorage`], which speaks a
//! small multipart upload API. The `attachment-migrate` tool moves legacy
//! local files through whichever backend is configured.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use solvehub_core::{Error, Result};

/// Result of a successful store operation.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Publicly reachable URL for the object.
    pub url: String,
    /// Backend-specific key, used for deletion.
    pub storage_key: String,
    /// Stored size in bytes.
    pub size_bytes: i64,
}

/// Storage backend trait for different storage implementations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store an object under the given key.
    async fn store(&self, key: &str, content_type: &str, data: &[u8]) -> Result<StoredObject>;

    /// Delete an object. Missing objects are not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Keep the extension, drop everything else that could escape the key space.
fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = std::path::Path::new(filename).extension()?.to_str()?;
    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_lowercase();
    (!ext.is_empty()).then_some(ext)
}

/// Generate a unique storage key: `{folder}/{uuid}[.ext]`.
///
/// The UUIDv7 prefix makes keys time-ordered; the original filename only
/// contributes its extension.
pub fn generate_storage_key(folder: &str, filename: &str) -> String {
    let id = Uuid::now_v7();
    match sanitized_extension(filename) {
        Some(ext) => format!("{}/{}.{}", folder.trim_matches('/'), id, ext),
        None => format!("{}/{}", folder.trim_matches('/'), id),
    }
}

// =============================================================================
// FILESYSTEM BACKEND
// =============================================================================

/// Filesystem storage backend.
///
/// Stores objects under `base_path/{key}` and reports URLs under
/// `public_base_url/{key}`; serving the directory is the deployment's job.
pub struct FilesystemBackend {
    base_path: PathBuf,
    public_base_url: String,
}

impl FilesystemBackend {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    /// Round-trip write/read/delete at startup to catch filesystem issues
    /// (permissions, missing mounts) before the first upload does.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let key = ".health-check/probe.bin";
        let data = b"storage-health-check";

        self.store(key, "application/octet-stream", data)
            .await
            .map_err(|e| format!("store: {}", e))?;
        let read_back = fs::read(self.full_path(key))
            .await
            .map_err(|e| format!("read: {}", e))?;
        if read_back != data {
            return Err("read-back mismatch".to_string());
        }
        self.delete(key).await.map_err(|e| format!("delete: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn store(&self, key: &str, _content_type: &str, data: &[u8]) -> Result<StoredObject> {
        let path = self.full_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }

        // Write to a temp name then rename, so a crash never leaves a
        // half-written object under the final key.
        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).await.map_err(Error::Io)?;
        file.write_all(data).await.map_err(Error::Io)?;
        file.flush().await.map_err(Error::Io)?;
        drop(file);
        fs::rename(&tmp, &path).await.map_err(Error::Io)?;

        debug!(
            subsystem = "db",
            component = "storage",
            key,
            size = data.len(),
            "Stored object on filesystem"
        );

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            storage_key: key.to_string(),
            size_bytes: data.len() as i64,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.full_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

// =============================================================================
// HTTP OBJECT STORAGE BACKEND
// =============================================================================

/// HTTP object-storage client.
///
/// Speaks a minimal upload API: `POST {endpoint}/upload` with multipart
/// fields `key` and `file`, answered with
/// `{"url": "...", "key": "...", "size": ...}`; `DELETE {endpoint}/objects/{key}`
/// removes an object.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, serde::Deserialize)]
struct UploadResponse {
    url: String,
    key: String,
    size: i64,
}

impl HttpObjectStorage {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageBackend for HttpObjectStorage {
    async fn store(&self, key: &str, content_type: &str, data: &[u8]) -> Result<StoredObject> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(key.to_string())
            .mime_str(content_type)
            .map_err(|e| Error::Storage(format!("Invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("key", key.to_string())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/upload", self.endpoint))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Storage(format!(
                "Upload failed with status {}",
                response.status()
            )));
        }

        let body: UploadResponse = response.json().await?;
        Ok(StoredObject {
            url: body.url,
            storage_key: body.key,
            size_bytes: body.size,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/objects/{}", self.endpoint, key))
            .send()
            .await?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(Error::Storage(format!(
                "Delete failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_storage_key_keeps_extension() {
        let key = generate_storage_key("solvehub", "Screen Shot (1).PNG");
        assert!(key.starts_with("solvehub/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_generate_storage_key_without_extension() {
        let key = generate_storage_key("solvehub/", "notes");
        assert!(key.starts_with("solvehub/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_generate_storage_keys_are_unique() {
        let a = generate_storage_key("f", "a.pdf");
        let b = generate_storage_key("f", "a.pdf");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_filesystem_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "http://localhost:3000/files");

        let stored = backend
            .store("solvehub/test.pdf", "application/pdf", b"%PDF-1.4")
            .await
            .unwrap();
        assert_eq!(stored.url, "http://localhost:3000/files/solvehub/test.pdf");
        assert_eq!(stored.size_bytes, 8);

        let on_disk = tokio::fs::read(dir.path().join("solvehub/test.pdf"))
            .await
            .unwrap();
        assert_eq!(on_disk, b"%PDF-1.4");

        backend.delete("solvehub/test.pdf").await.unwrap();
        // Deleting again is not an error.
        backend.delete("solvehub/test.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_filesystem_backend_validate() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "http://localhost:3000/files");
        backend.validate().await.unwrap();
    }
}
