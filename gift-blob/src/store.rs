use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PhotoError, PhotoResult};

/// Core photo storage operations - must be implemented by all storage backends
///
/// Photos live in one logical bucket, grouped under the owning gift's id as
/// a namespace prefix. A backend must never let one gift's operations touch
/// another gift's objects.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store a photo under the gift's namespace
    async fn put(
        &self,
        gift_id: &str,
        name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> PhotoResult<StoredPhoto>;

    /// Enumerate all photos in the gift's namespace, ordered by object name;
    /// empty if none
    async fn list(&self, gift_id: &str) -> PhotoResult<Vec<StoredPhoto>>;

    /// Resolve the public URL for a photo without a network round-trip
    fn public_url(&self, gift_id: &str, name: &str) -> String;

    /// Bulk-delete photos from the gift's namespace
    ///
    /// Removing an already-absent object is a no-op. Any real deletion
    /// failure errors the whole call so the caller knows the namespace may
    /// still hold objects.
    async fn remove_all(&self, gift_id: &str, names: &[String]) -> PhotoResult<()>;
}

/// Descriptor for a stored photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPhoto {
    /// Object name within the gift's namespace, e.g. `0-beach.jpg`
    pub name: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Build the object name for an uploaded photo: `{index}-{filename}`,
/// with the filename sanitized so it cannot escape the namespace.
pub fn photo_name(index: usize, filename: &str) -> String {
    format!("{}-{}", index, sanitize_filename(filename))
}

/// Replace path separators and control characters so a client-supplied
/// filename can be used as an object name.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // ".." would still be meaningful to a filesystem backend
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "photo".to_string()
    } else {
        cleaned
    }
}

/// Shared invariant checks for backends: namespace and object names must be
/// non-empty and must not traverse outside the namespace.
pub(crate) fn check_object_ref(gift_id: &str, name: &str) -> PhotoResult<()> {
    if gift_id.is_empty() || gift_id.contains('/') || gift_id.contains('\\') {
        return Err(PhotoError::invalid(format!(
            "Invalid gift namespace: {:?}",
            gift_id
        )));
    }
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(PhotoError::invalid(format!("Invalid object name: {:?}", name)));
    }
    Ok(())
}

pub(crate) fn check_namespace(gift_id: &str) -> PhotoResult<()> {
    if gift_id.is_empty() || gift_id.contains('/') || gift_id.contains('\\') {
        return Err(PhotoError::invalid(format!(
            "Invalid gift namespace: {:?}",
            gift_id
        )));
    }
    Ok(())
}
