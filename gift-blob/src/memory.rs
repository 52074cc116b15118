use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::store::{check_namespace, check_object_ref};
use crate::{PhotoResult, PhotoStore, StoredPhoto};

/// Namespace map: gift_id -> object name -> blob (BTreeMap keeps the
/// index-prefixed names in upload order)
type Namespaces = HashMap<String, BTreeMap<String, PhotoBlob>>;

#[derive(Clone)]
struct PhotoBlob {
    bytes: Bytes,
    content_type: Option<String>,
    uploaded_at: DateTime<Utc>,
}

/// In-memory photo store for testing and development
#[derive(Clone)]
pub struct MemoryPhotoStore {
    namespaces: Arc<RwLock<Namespaces>>,
    base_url: String,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::with_base_url("memory://gift-photos")
    }

    /// Base URL used by `public_url`; no trailing slash
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            namespaces: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Raw bytes of a stored photo, if present (test helper)
    pub fn bytes_of(&self, gift_id: &str, name: &str) -> Option<Bytes> {
        self.namespaces
            .read()
            .get(gift_id)
            .and_then(|ns| ns.get(name))
            .map(|blob| blob.bytes.clone())
    }

    /// Number of objects currently held under the gift's namespace
    pub fn namespace_len(&self, gift_id: &str) -> usize {
        self.namespaces
            .read()
            .get(gift_id)
            .map(|ns| ns.len())
            .unwrap_or(0)
    }
}

impl Default for MemoryPhotoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn put(
        &self,
        gift_id: &str,
        name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> PhotoResult<StoredPhoto> {
        check_object_ref(gift_id, name)?;

        let now = Utc::now();
        let blob = PhotoBlob {
            bytes,
            content_type: content_type.map(|ct| ct.to_string()),
            uploaded_at: now,
        };
        let stored = StoredPhoto {
            name: name.to_string(),
            size_bytes: blob.bytes.len() as u64,
            content_type: blob.content_type.clone(),
            uploaded_at: now,
        };

        self.namespaces
            .write()
            .entry(gift_id.to_string())
            .or_default()
            .insert(name.to_string(), blob);

        Ok(stored)
    }

    async fn list(&self, gift_id: &str) -> PhotoResult<Vec<StoredPhoto>> {
        check_namespace(gift_id)?;

        let namespaces = self.namespaces.read();
        let Some(ns) = namespaces.get(gift_id) else {
            return Ok(vec![]);
        };

        Ok(ns
            .iter()
            .map(|(name, blob)| StoredPhoto {
                name: name.clone(),
                size_bytes: blob.bytes.len() as u64,
                content_type: blob.content_type.clone(),
                uploaded_at: blob.uploaded_at,
            })
            .collect())
    }

    fn public_url(&self, gift_id: &str, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, gift_id, name)
    }

    async fn remove_all(&self, gift_id: &str, names: &[String]) -> PhotoResult<()> {
        check_namespace(gift_id)?;

        let mut namespaces = self.namespaces.write();
        if let Some(ns) = namespaces.get_mut(gift_id) {
            for name in names {
                // absent objects are already in the desired state
                ns.remove(name);
            }
            if ns.is_empty() {
                namespaces.remove(gift_id);
            }
        }
        Ok(())
    }
}
