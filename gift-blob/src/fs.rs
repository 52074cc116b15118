use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;

use crate::store::{check_namespace, check_object_ref};
use crate::{PhotoResult, PhotoStore, StoredPhoto};

/// Filesystem-backed photo store: one directory per gift namespace under a
/// fixed root.
///
/// Content types are not persisted; `list` reports them as unknown. The
/// directory tree is expected to be served by whatever fronts the deployment
/// (CDN, reverse proxy), which is what `base_url` points at.
#[derive(Debug, Clone)]
pub struct FsPhotoStore {
    root: PathBuf,
    base_url: String,
}

impl FsPhotoStore {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(root: P, base_url: S) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn namespace_dir(&self, gift_id: &str) -> PathBuf {
        self.root.join(gift_id)
    }

    fn object_path(&self, gift_id: &str, name: &str) -> PathBuf {
        self.namespace_dir(gift_id).join(name)
    }

    async fn stat(path: &Path) -> PhotoResult<(u64, DateTime<Utc>)> {
        let meta = fs::metadata(path).await?;
        let modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok((meta.len(), modified))
    }
}

#[async_trait]
impl PhotoStore for FsPhotoStore {
    async fn put(
        &self,
        gift_id: &str,
        name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> PhotoResult<StoredPhoto> {
        check_object_ref(gift_id, name)?;

        fs::create_dir_all(self.namespace_dir(gift_id)).await?;

        let path = self.object_path(gift_id, name);
        fs::write(&path, &bytes).await?;

        let (size_bytes, uploaded_at) = Self::stat(&path).await?;
        Ok(StoredPhoto {
            name: name.to_string(),
            size_bytes,
            content_type: content_type.map(|ct| ct.to_string()),
            uploaded_at,
        })
    }

    async fn list(&self, gift_id: &str) -> PhotoResult<Vec<StoredPhoto>> {
        check_namespace(gift_id)?;

        let dir = self.namespace_dir(gift_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut photos = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let uploaded_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            photos.push(StoredPhoto {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
                content_type: None,
                uploaded_at,
            });
        }

        photos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(photos)
    }

    fn public_url(&self, gift_id: &str, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, gift_id, name)
    }

    async fn remove_all(&self, gift_id: &str, names: &[String]) -> PhotoResult<()> {
        check_namespace(gift_id)?;

        for name in names {
            check_object_ref(gift_id, name)?;
            match fs::remove_file(self.object_path(gift_id, name)).await {
                Ok(()) => {}
                // already gone is the desired end state
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        // Drop the namespace dir if we emptied it; failure here is harmless.
        let _ = fs::remove_dir(self.namespace_dir(gift_id)).await;
        Ok(())
    }
}
