use async_trait::async_trait;

use crate::error::GiftResult;
use crate::types::{Gift, GiftId, GiftToken, NewGift, Section};

/// Durable record storage for gifts, keyed publicly by token.
///
/// The gift record is the single synchronization point of the lifecycle, so
/// the contract leans on idempotence instead of locking:
/// - setting a viewed flag that is already true is a no-op that still succeeds
/// - deleting an absent record is success, since the end state is achieved
/// - a token that was purged looks exactly like a token that never existed
#[async_trait]
pub trait GiftStore: Send + Sync {
    /// Insert a new record with freshly generated id and token.
    /// Fails with `Persistence` on constraint violation or backend failure.
    async fn create(&self, fields: NewGift) -> GiftResult<Gift>;

    /// Look up by public token; `NotFoundOrExpired` if absent.
    async fn fetch_by_token(&self, token: &GiftToken) -> GiftResult<Gift>;

    /// Set exactly one section's viewed flag true and return the record as
    /// stored after the write. Callers decide about purge from that snapshot,
    /// never from state they read earlier.
    async fn mark_viewed(&self, id: &GiftId, section: Section) -> GiftResult<Gift>;

    /// Remove the record. Removing an absent record is success.
    async fn delete(&self, id: &GiftId) -> GiftResult<()>;
}
