use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{GiftError, GiftResult};
use crate::store::GiftStore;
use crate::types::{Gift, GiftId, GiftToken, NewGift, Section};

struct Inner {
    /// Gift records indexed by id
    records: HashMap<GiftId, Gift>,

    /// Public lookup index: token -> id
    tokens: HashMap<GiftToken, GiftId>,
}

/// In-memory store for testing and development.
///
/// Both maps live under one lock so create, mark_viewed and delete are each
/// atomic; `mark_viewed` in particular is a single read-modify-write. Clones
/// share state.
#[derive(Clone)]
pub struct MemoryGiftStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryGiftStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                records: HashMap::new(),
                tokens: HashMap::new(),
            })),
        }
    }

    /// Number of live records; handy for asserting a purge landed.
    pub fn record_count(&self) -> usize {
        self.inner.read().records.len()
    }
}

impl Default for MemoryGiftStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GiftStore for MemoryGiftStore {
    async fn create(&self, fields: NewGift) -> GiftResult<Gift> {
        let gift = Gift::new(fields);
        let mut inner = self.inner.write();

        // Emulates the unique constraint a durable backend would enforce.
        if inner.tokens.contains_key(&gift.token) {
            return Err(GiftError::persistence(format!(
                "token collision: {}",
                gift.token
            )));
        }

        inner.tokens.insert(gift.token.clone(), gift.id.clone());
        inner.records.insert(gift.id.clone(), gift.clone());
        Ok(gift)
    }

    async fn fetch_by_token(&self, token: &GiftToken) -> GiftResult<Gift> {
        let inner = self.inner.read();
        inner
            .tokens
            .get(token)
            .and_then(|id| inner.records.get(id))
            .cloned()
            .ok_or(GiftError::NotFoundOrExpired)
    }

    async fn mark_viewed(&self, id: &GiftId, section: Section) -> GiftResult<Gift> {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(id)
            .ok_or(GiftError::NotFoundOrExpired)?;
        record.mark_viewed(section);
        Ok(record.clone())
    }

    async fn delete(&self, id: &GiftId) -> GiftResult<()> {
        let mut inner = self.inner.write();
        if let Some(gift) = inner.records.remove(id) {
            inner.tokens.remove(&gift.token);
        }
        // Absent already means the end state is achieved.
        Ok(())
    }
}
