//! Filesystem blob backend
//!
//! Stores blobs as files under a root directory, one subdirectory per
//! folder. References are built from a configured public base URL under
//! which the root directory is served.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::BlobBackend;
use crate::errors::StoreError;

pub struct FsBlobBackend {
    root: PathBuf,
    base_url: String,
}

impl FsBlobBackend {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Map a blob name onto a path under the root, rejecting traversal
    fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.starts_with('/') || name.split('/').any(|part| part == "..") {
            return Err(StoreError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobBackend for FsBlobBackend {
    async fn exists(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.resolve(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn put(
        &self,
        name: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, StoreError> {
        let path = self.resolve(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(self.url(name))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        // Prefixes are `folder/` (or `folder/partial-name`); list the folder
        // and filter on the full prefix.
        let (dir, _) = prefix.rsplit_once('/').unwrap_or(("", prefix));
        let dir_path = if dir.is_empty() {
            self.root.clone()
        } else {
            self.resolve(dir)?
        };

        let mut names = Vec::new();
        let mut entries = match fs::read_dir(&dir_path).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let name = if dir.is_empty() {
                file_name
            } else {
                format!("{dir}/{file_name}")
            };
            if name.starts_with(prefix) {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, FsBlobBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBlobBackend::new(dir.path(), "http://blobs.test/");
        (dir, backend)
    }

    #[tokio::test]
    async fn put_then_exists_and_list() {
        let (_dir, backend) = backend();

        let url = backend
            .put("emote_api/catJAM.webp", b"bytes", "image/webp")
            .await
            .unwrap();
        assert_eq!(url, "http://blobs.test/emote_api/catJAM.webp");
        assert!(backend.exists("emote_api/catJAM.webp").await.unwrap());
        assert!(!backend.exists("emote_api/other.webp").await.unwrap());

        let names = backend.list("emote_api/").await.unwrap();
        assert_eq!(names, vec!["emote_api/catJAM.webp"]);
    }

    #[tokio::test]
    async fn listing_missing_folder_is_empty() {
        let (_dir, backend) = backend();
        assert!(backend.list("trending_emotes/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn traversal_names_are_rejected() {
        let (_dir, backend) = backend();
        let err = backend
            .put("../outside.png", b"x", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidName { .. }));
        assert!(matches!(
            backend.exists("/abs.png").await.unwrap_err(),
            StoreError::InvalidName { .. }
        ));
    }
}
