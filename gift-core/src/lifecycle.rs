//! The creation, single-use viewing, and destruction protocol.
//!
//! Correctness here never comes from locking: the gift record is the only
//! shared state, every mutation of it is idempotent, and the fully-viewed
//! condition is absorbing. Duplicated or re-ordered calls converge on the
//! same end state: the gift gone, its photos gone first.

use std::sync::Arc;

use gift_blob::{photo_name, PhotoStore};
use tracing::warn;

use crate::config::GiftConfig;
use crate::error::{GiftError, GiftResult};
use crate::store::GiftStore;
use crate::types::{
    CreateGift, Gift, GiftCreated, GiftToken, GiftView, NewGift, Section, SectionContent,
    SectionView, ViewedFlags,
};

/// The lifecycle manager, the piece the HTTP layer embeds.
pub struct GiftLifecycle {
    gifts: Arc<dyn GiftStore>,
    photos: Arc<dyn PhotoStore>,
    config: GiftConfig,
}

impl GiftLifecycle {
    /// Create a new lifecycle manager over the two stores
    pub fn new<G, P>(gifts: G, photos: P, config: GiftConfig) -> Self
    where
        G: GiftStore + 'static,
        P: PhotoStore + 'static,
    {
        Self {
            gifts: Arc::new(gifts),
            photos: Arc::new(photos),
            config,
        }
    }

    pub fn config(&self) -> &GiftConfig {
        &self.config
    }

    /// Make a gift: validate, persist the record, upload the photos, hand
    /// back the share token.
    ///
    /// The record is created first so the photos have an id namespace to
    /// land in. If any upload fails, what was written so far is removed
    /// again (photos, then record) and the creator gets an error; a token
    /// is only ever returned for a gift whose every photo landed. A record
    /// that survives a failed cleanup is unreachable garbage: its token was
    /// never handed out.
    pub async fn create_gift(&self, request: CreateGift) -> GiftResult<GiftCreated> {
        let fields = self.validate(&request)?;

        let gift = self.gifts.create(fields).await?;

        let mut uploaded: Vec<String> = Vec::with_capacity(request.photos.len());
        for (index, photo) in request.photos.iter().enumerate() {
            let name = photo_name(index, &photo.filename);
            let put = self
                .photos
                .put(
                    gift.id.as_str(),
                    &name,
                    photo.content_type.as_deref(),
                    photo.bytes.clone(),
                )
                .await;
            match put {
                Ok(_) => uploaded.push(name),
                Err(e) => {
                    self.unwind_creation(&gift, &uploaded).await;
                    return Err(GiftError::partial_creation(format!(
                        "upload of {name} failed: {e}"
                    )));
                }
            }
        }

        Ok(GiftCreated {
            url: self.config.share_url(&gift.token),
            token: gift.token,
        })
    }

    /// Everything a viewer sees when opening the share link: names, texts,
    /// resolved photo URLs and the current viewed flags. Flips nothing.
    pub async fn fetch_gift(&self, token: &GiftToken) -> GiftResult<GiftView> {
        let gift = self.gifts.fetch_by_token(token).await?;
        let photo_urls = self.photo_urls(&gift).await?;
        let viewed = gift.viewed_flags();
        Ok(GiftView {
            creator_name: gift.creator_name,
            lover_name: gift.lover_name,
            letter_text: gift.letter_text,
            promise_text: gift.promise_text,
            photo_urls,
            viewed,
        })
    }

    /// Reveal one section and record that it was seen.
    ///
    /// Content is served regardless of the section's current flag: a
    /// reload shows the letter again; it is the flag transition that is
    /// idempotent, not content exposure. The purge decision is taken from
    /// the record exactly as the store returns it after the write, never
    /// from state read earlier: when that snapshot has all three flags
    /// true, the photos are deleted and then the record.
    ///
    /// Once the content has been read, store failures stop mattering to
    /// the viewer: a failed flag write is logged and the flags come back
    /// as stored, so the next view of that section retries the write.
    /// Purge failure is likewise logged, never surfaced, and the
    /// surviving record makes the next view of this token take the
    /// all-viewed branch and retry.
    pub async fn view_section(
        &self,
        token: &GiftToken,
        section: Section,
    ) -> GiftResult<SectionView> {
        let gift = self.gifts.fetch_by_token(token).await?;

        let content = self.section_content(&gift, section).await?;

        let after = match self.gifts.mark_viewed(&gift.id, section).await {
            Ok(after) => after,
            Err(GiftError::NotFoundOrExpired) => {
                // The record existed when we fetched it, and only a purge
                // removes records, so a concurrent view just completed the
                // gift. Our flag is part of that terminal state; serve the
                // content we already read.
                return Ok(SectionView {
                    section,
                    content,
                    viewed: ViewedFlags {
                        photos: true,
                        letter: true,
                        promise: true,
                    },
                });
            }
            Err(e) => {
                // Content is already in hand; the flags go back as stored
                // and a later view retries the write.
                warn!(
                    "View of gift {} could not record section {}: {}",
                    gift.id, section, e
                );
                return Ok(SectionView {
                    section,
                    content,
                    viewed: gift.viewed_flags(),
                });
            }
        };

        if after.all_viewed() {
            self.purge(&after).await;
        }

        Ok(SectionView {
            section,
            content,
            viewed: after.viewed_flags(),
        })
    }

    fn validate(&self, request: &CreateGift) -> GiftResult<NewGift> {
        let creator_name = request.creator_name.trim();
        if creator_name.is_empty() {
            return Err(GiftError::validation("creator_name must not be blank"));
        }
        let lover_name = request.lover_name.trim();
        if lover_name.is_empty() {
            return Err(GiftError::validation("lover_name must not be blank"));
        }
        let letter_text = request.letter_text.trim();
        if letter_text.is_empty() {
            return Err(GiftError::validation("letter_text must not be blank"));
        }
        let promise_text = request.promise_text.trim();
        if promise_text.is_empty() {
            return Err(GiftError::validation("promise_text must not be blank"));
        }

        let count = request.photos.len();
        if count < self.config.min_photos || count > self.config.max_photos {
            return Err(GiftError::validation(format!(
                "a gift carries {} to {} photos, got {count}",
                self.config.min_photos, self.config.max_photos
            )));
        }

        for (index, photo) in request.photos.iter().enumerate() {
            if photo.filename.trim().is_empty() {
                return Err(GiftError::validation(format!(
                    "photo {index} has no filename"
                )));
            }
            match photo.content_type.as_deref() {
                Some(ct) if ct.starts_with("image/") => {}
                Some(ct) => {
                    return Err(GiftError::validation(format!(
                        "photo {index} is {ct}, expected an image"
                    )))
                }
                None => {
                    return Err(GiftError::validation(format!(
                        "photo {index} has no content type"
                    )))
                }
            }
            if photo.bytes.len() as u64 > self.config.max_photo_bytes {
                return Err(GiftError::validation(format!(
                    "photo {index} exceeds the {} byte limit",
                    self.config.max_photo_bytes
                )));
            }
        }

        Ok(NewGift {
            creator_name: creator_name.to_string(),
            lover_name: lover_name.to_string(),
            letter_text: Some(letter_text.to_string()),
            promise_text: Some(promise_text.to_string()),
        })
    }

    async fn section_content(&self, gift: &Gift, section: Section) -> GiftResult<SectionContent> {
        Ok(match section {
            Section::Photos => SectionContent::Photos {
                urls: self.photo_urls(gift).await?,
            },
            Section::Letter => SectionContent::Letter {
                text: gift.letter_text.clone().unwrap_or_default(),
            },
            Section::Promise => SectionContent::Promise {
                text: gift.promise_text.clone().unwrap_or_default(),
            },
        })
    }

    async fn photo_urls(&self, gift: &Gift) -> GiftResult<Vec<String>> {
        let photos = self.photos.list(gift.id.as_str()).await?;
        Ok(photos
            .iter()
            .map(|p| self.photos.public_url(gift.id.as_str(), &p.name))
            .collect())
    }

    /// Blobs first, then the record; a record may never outlive this call
    /// while pointing at deleted photos the other way around.
    async fn purge(&self, gift: &Gift) {
        let names = match self.photos.list(gift.id.as_str()).await {
            Ok(photos) => photos.into_iter().map(|p| p.name).collect::<Vec<_>>(),
            Err(e) => {
                warn!("Purge of gift {} could not list photos: {}", gift.id, e);
                return;
            }
        };

        if let Err(e) = self.photos.remove_all(gift.id.as_str(), &names).await {
            // Record stays; the next view of this token retries the purge.
            warn!("Purge of gift {} could not remove photos: {}", gift.id, e);
            return;
        }

        if let Err(e) = self.gifts.delete(&gift.id).await {
            warn!("Purge of gift {} removed photos but not the record: {}", gift.id, e);
        }
    }

    /// Undo a half-made gift: photos first, record second, same order as
    /// purge. Skipping the record delete when photo cleanup fails keeps
    /// blobs from outliving their record.
    async fn unwind_creation(&self, gift: &Gift, uploaded: &[String]) {
        match self.photos.remove_all(gift.id.as_str(), uploaded).await {
            Ok(()) => {
                if let Err(e) = self.gifts.delete(&gift.id).await {
                    warn!("Cleanup of failed gift {} left the record: {}", gift.id, e);
                }
            }
            Err(e) => {
                warn!("Cleanup of failed gift {} left photos and record: {}", gift.id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use gift_blob::{MemoryPhotoStore, PhotoError, PhotoResult, StoredPhoto};

    use super::*;
    use crate::memory::MemoryGiftStore;
    use crate::types::PhotoUpload;

    fn photo(filename: &str) -> PhotoUpload {
        PhotoUpload {
            filename: filename.to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: Bytes::from_static(b"\xff\xd8\xff"),
        }
    }

    fn create_test_request(photo_count: usize) -> CreateGift {
        CreateGift {
            creator_name: "Sam".to_string(),
            lover_name: "Alex".to_string(),
            letter_text: "I adore you".to_string(),
            promise_text: "Always".to_string(),
            photos: (0..photo_count)
                .map(|i| photo(&format!("pic{i}.jpg")))
                .collect(),
        }
    }

    fn test_lifecycle() -> (GiftLifecycle, MemoryGiftStore, MemoryPhotoStore) {
        let gifts = MemoryGiftStore::new();
        let photos = MemoryPhotoStore::new();
        let lifecycle = GiftLifecycle::new(gifts.clone(), photos.clone(), GiftConfig::default());
        (lifecycle, gifts, photos)
    }

    async fn gift_id_of(gifts: &MemoryGiftStore, token: &GiftToken) -> String {
        gifts
            .fetch_by_token(token)
            .await
            .unwrap()
            .id
            .as_str()
            .to_string()
    }

    #[tokio::test]
    async fn test_create_then_view_any_section() {
        let (lifecycle, _, _) = test_lifecycle();
        let created = lifecycle
            .create_gift(create_test_request(2))
            .await
            .unwrap();
        assert!(created.token.as_str().starts_with("gft_"));
        assert!(created.url.ends_with(&format!("/gift/{}", created.token)));

        let view = lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();
        assert_eq!(
            view.content,
            SectionContent::Letter {
                text: "I adore you".to_string()
            }
        );
        assert!(view.viewed.letter);
        assert!(!view.viewed.photos);

        let view = lifecycle
            .view_section(&created.token, Section::Photos)
            .await
            .unwrap();
        match view.content {
            SectionContent::Photos { urls } => {
                assert_eq!(urls.len(), 2);
                assert!(urls[0].contains("0-pic0.jpg"));
                assert!(urls[1].contains("1-pic1.jpg"));
            }
            other => panic!("expected photos, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_view_order_ends_in_purge() {
        let orders = [
            [Section::Photos, Section::Letter, Section::Promise],
            [Section::Photos, Section::Promise, Section::Letter],
            [Section::Letter, Section::Photos, Section::Promise],
            [Section::Letter, Section::Promise, Section::Photos],
            [Section::Promise, Section::Photos, Section::Letter],
            [Section::Promise, Section::Letter, Section::Photos],
        ];

        for order in orders {
            let (lifecycle, gifts, photos) = test_lifecycle();
            let created = lifecycle
                .create_gift(create_test_request(2))
                .await
                .unwrap();
            let id = gift_id_of(&gifts, &created.token).await;

            for (step, section) in order.into_iter().enumerate() {
                let view = lifecycle.view_section(&created.token, section).await.unwrap();
                let done = step == 2;
                assert_eq!(view.viewed.all_viewed(), done, "order {order:?} step {step}");
            }

            assert_eq!(gifts.record_count(), 0, "record survived order {order:?}");
            assert_eq!(photos.namespace_len(&id), 0, "photos survived order {order:?}");

            let err = lifecycle
                .view_section(&created.token, Section::Photos)
                .await
                .unwrap_err();
            assert!(matches!(err, GiftError::NotFoundOrExpired));
        }
    }

    #[tokio::test]
    async fn test_repeat_view_is_idempotent_and_does_not_purge() {
        let (lifecycle, gifts, _) = test_lifecycle();
        let created = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap();

        let first = lifecycle
            .view_section(&created.token, Section::Photos)
            .await
            .unwrap();
        let second = lifecycle
            .view_section(&created.token, Section::Photos)
            .await
            .unwrap();

        assert_eq!(first.content, second.content);
        assert!(first.viewed.photos && second.viewed.photos);
        assert!(!second.viewed.all_viewed());
        assert_eq!(gifts.record_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_final_views_converge() {
        let (lifecycle, gifts, photos) = test_lifecycle();
        let lifecycle = Arc::new(lifecycle);
        let created = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap();
        let id = gift_id_of(&gifts, &created.token).await;

        lifecycle
            .view_section(&created.token, Section::Photos)
            .await
            .unwrap();
        lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();

        let a = {
            let lifecycle = lifecycle.clone();
            let token = created.token.clone();
            tokio::spawn(async move { lifecycle.view_section(&token, Section::Promise).await })
        };
        let b = {
            let lifecycle = lifecycle.clone();
            let token = created.token.clone();
            tokio::spawn(async move { lifecycle.view_section(&token, Section::Promise).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];

        // At least one call served the promise; a call that started after
        // the purge landed sees the token as never-existed, nothing else.
        assert!(results.iter().any(|r| r.is_ok()));
        for result in results {
            match result {
                Ok(view) => assert!(view.viewed.all_viewed()),
                Err(e) => assert!(matches!(e, GiftError::NotFoundOrExpired)),
            }
        }

        assert_eq!(gifts.record_count(), 0);
        assert_eq!(photos.namespace_len(&id), 0);
    }

    /// Store double reproducing the tightest interleaving: another viewer
    /// completes the gift and purges it between our fetch and our write.
    struct PurgedUnderneathStore {
        inner: MemoryGiftStore,
        photos: MemoryPhotoStore,
    }

    #[async_trait]
    impl GiftStore for PurgedUnderneathStore {
        async fn create(&self, fields: NewGift) -> GiftResult<Gift> {
            self.inner.create(fields).await
        }

        async fn fetch_by_token(&self, token: &GiftToken) -> GiftResult<Gift> {
            self.inner.fetch_by_token(token).await
        }

        async fn mark_viewed(&self, id: &crate::GiftId, section: Section) -> GiftResult<Gift> {
            let names: Vec<String> = self
                .photos
                .list(id.as_str())
                .await
                .unwrap()
                .into_iter()
                .map(|p| p.name)
                .collect();
            self.photos.remove_all(id.as_str(), &names).await.unwrap();
            self.inner.delete(id).await.unwrap();
            self.inner.mark_viewed(id, section).await
        }

        async fn delete(&self, id: &crate::GiftId) -> GiftResult<()> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_view_racing_a_purge_still_serves_content() {
        let gifts = MemoryGiftStore::new();
        let photos = MemoryPhotoStore::new();
        let racing = PurgedUnderneathStore {
            inner: gifts.clone(),
            photos: photos.clone(),
        };
        let lifecycle = GiftLifecycle::new(racing, photos.clone(), GiftConfig::default());

        let created = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap();

        let view = lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();
        assert_eq!(
            view.content,
            SectionContent::Letter {
                text: "I adore you".to_string()
            }
        );
        assert!(view.viewed.all_viewed());
        assert_eq!(gifts.record_count(), 0);
    }

    #[tokio::test]
    async fn test_photo_count_bounds() {
        let (lifecycle, gifts, _) = test_lifecycle();

        let err = lifecycle
            .create_gift(create_test_request(0))
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::Validation { .. }));

        let err = lifecycle
            .create_gift(create_test_request(6))
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::Validation { .. }));

        // Rejected before any store mutation.
        assert_eq!(gifts.record_count(), 0);

        assert!(lifecycle.create_gift(create_test_request(5)).await.is_ok());
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let (lifecycle, _, _) = test_lifecycle();

        for field in ["creator_name", "lover_name", "letter_text", "promise_text"] {
            let mut request = create_test_request(1);
            match field {
                "creator_name" => request.creator_name = "   ".to_string(),
                "lover_name" => request.lover_name = String::new(),
                "letter_text" => request.letter_text = "\n\t".to_string(),
                _ => request.promise_text = " ".to_string(),
            }
            let err = lifecycle.create_gift(request).await.unwrap_err();
            assert!(
                matches!(err, GiftError::Validation { .. }),
                "{field} should be required"
            );
        }
    }

    #[tokio::test]
    async fn test_photo_shape_rejected() {
        let (lifecycle, gifts, _) = test_lifecycle();

        let mut request = create_test_request(2);
        request.photos[1].content_type = Some("application/pdf".to_string());
        let err = lifecycle.create_gift(request).await.unwrap_err();
        assert!(matches!(err, GiftError::Validation { .. }));

        let mut request = create_test_request(2);
        request.photos[0].content_type = None;
        assert!(lifecycle.create_gift(request).await.is_err());

        let mut request = create_test_request(2);
        request.photos[1].filename = "   ".to_string();
        let err = lifecycle.create_gift(request).await.unwrap_err();
        assert!(matches!(err, GiftError::Validation { .. }));
        assert_eq!(gifts.record_count(), 0);

        let lifecycle = GiftLifecycle::new(
            MemoryGiftStore::new(),
            MemoryPhotoStore::new(),
            GiftConfig::default().with_max_photo_bytes(2),
        );
        let err = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::Validation { .. }));
    }

    /// Photo store double whose put starts failing after a set number of
    /// successes. Remembers the namespace it was asked to write to.
    struct FailingPutStore {
        inner: MemoryPhotoStore,
        allow: usize,
        puts: AtomicUsize,
        seen_namespace: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl gift_blob::PhotoStore for FailingPutStore {
        async fn put(
            &self,
            gift_id: &str,
            name: &str,
            content_type: Option<&str>,
            bytes: Bytes,
        ) -> PhotoResult<StoredPhoto> {
            *self.seen_namespace.lock().unwrap() = Some(gift_id.to_string());
            if self.puts.fetch_add(1, Ordering::SeqCst) >= self.allow {
                return Err(PhotoError::backend(std::io::Error::other("disk full")));
            }
            self.inner.put(gift_id, name, content_type, bytes).await
        }

        async fn list(&self, gift_id: &str) -> PhotoResult<Vec<StoredPhoto>> {
            self.inner.list(gift_id).await
        }

        fn public_url(&self, gift_id: &str, name: &str) -> String {
            self.inner.public_url(gift_id, name)
        }

        async fn remove_all(&self, gift_id: &str, names: &[String]) -> PhotoResult<()> {
            self.inner.remove_all(gift_id, names).await
        }
    }

    #[tokio::test]
    async fn test_failed_upload_unwinds_record_and_photos() {
        let gifts = MemoryGiftStore::new();
        let photos = MemoryPhotoStore::new();
        let seen_namespace = Arc::new(Mutex::new(None));
        let failing = FailingPutStore {
            inner: photos.clone(),
            allow: 1,
            puts: AtomicUsize::new(0),
            seen_namespace: Arc::clone(&seen_namespace),
        };
        let lifecycle = GiftLifecycle::new(gifts.clone(), failing, GiftConfig::default());

        let err = lifecycle
            .create_gift(create_test_request(3))
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::PartialCreation { .. }));

        // Nothing left behind: not the record, not the photo that landed.
        assert_eq!(gifts.record_count(), 0);
        let id = seen_namespace.lock().unwrap().clone().unwrap();
        assert_eq!(photos.namespace_len(&id), 0);
    }

    /// Photo store double whose remove_all fails a set number of times
    /// before behaving again.
    struct FlakyRemoveStore {
        inner: MemoryPhotoStore,
        failures_left: AtomicUsize,
    }

    #[async_trait]
    impl gift_blob::PhotoStore for FlakyRemoveStore {
        async fn put(
            &self,
            gift_id: &str,
            name: &str,
            content_type: Option<&str>,
            bytes: Bytes,
        ) -> PhotoResult<StoredPhoto> {
            self.inner.put(gift_id, name, content_type, bytes).await
        }

        async fn list(&self, gift_id: &str) -> PhotoResult<Vec<StoredPhoto>> {
            self.inner.list(gift_id).await
        }

        fn public_url(&self, gift_id: &str, name: &str) -> String {
            self.inner.public_url(gift_id, name)
        }

        async fn remove_all(&self, gift_id: &str, names: &[String]) -> PhotoResult<()> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(PhotoError::backend(std::io::Error::other("bucket offline")));
            }
            self.inner.remove_all(gift_id, names).await
        }
    }

    #[tokio::test]
    async fn test_failed_purge_heals_on_next_view() {
        let gifts = MemoryGiftStore::new();
        let photos = MemoryPhotoStore::new();
        let flaky = FlakyRemoveStore {
            inner: photos.clone(),
            failures_left: AtomicUsize::new(1),
        };
        let lifecycle = GiftLifecycle::new(gifts.clone(), flaky, GiftConfig::default());

        let created = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap();
        let id = gift_id_of(&gifts, &created.token).await;

        lifecycle
            .view_section(&created.token, Section::Photos)
            .await
            .unwrap();
        lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();

        // Completing view: purge fails on remove_all, the viewer still gets
        // content, and the record stays so the token remains claimable.
        let view = lifecycle
            .view_section(&created.token, Section::Promise)
            .await
            .unwrap();
        assert!(view.viewed.all_viewed());
        assert_eq!(gifts.record_count(), 1);
        assert_eq!(photos.namespace_len(&id), 1);

        // Any further view re-enters the all-viewed branch and finishes the
        // job.
        lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();
        assert_eq!(gifts.record_count(), 0);
        assert_eq!(photos.namespace_len(&id), 0);

        let err = lifecycle
            .view_section(&created.token, Section::Promise)
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::NotFoundOrExpired));
    }

    /// Record store double whose flag writes fail while everything else
    /// keeps working.
    struct FailingMarkStore {
        inner: MemoryGiftStore,
    }

    #[async_trait]
    impl GiftStore for FailingMarkStore {
        async fn create(&self, fields: NewGift) -> GiftResult<Gift> {
            self.inner.create(fields).await
        }

        async fn fetch_by_token(&self, token: &GiftToken) -> GiftResult<Gift> {
            self.inner.fetch_by_token(token).await
        }

        async fn mark_viewed(&self, _id: &crate::GiftId, _section: Section) -> GiftResult<Gift> {
            Err(GiftError::persistence("records offline"))
        }

        async fn delete(&self, id: &crate::GiftId) -> GiftResult<()> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_failed_flag_write_still_serves_content() {
        let gifts = MemoryGiftStore::new();
        let lifecycle = GiftLifecycle::new(
            FailingMarkStore {
                inner: gifts.clone(),
            },
            MemoryPhotoStore::new(),
            GiftConfig::default(),
        );

        let created = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap();

        let view = lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();
        assert_eq!(
            view.content,
            SectionContent::Letter {
                text: "I adore you".to_string()
            }
        );

        // The flip never landed: the flags report the stored state and the
        // record stays for a retry.
        assert_eq!(view.viewed, ViewedFlags::default());
        assert_eq!(gifts.record_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_gift_reads_without_flipping() {
        let (lifecycle, gifts, _) = test_lifecycle();
        let created = lifecycle
            .create_gift(create_test_request(2))
            .await
            .unwrap();

        let view = lifecycle.fetch_gift(&created.token).await.unwrap();
        assert_eq!(view.creator_name, "Sam");
        assert_eq!(view.lover_name, "Alex");
        assert_eq!(view.letter_text.as_deref(), Some("I adore you"));
        assert_eq!(view.promise_text.as_deref(), Some("Always"));
        assert_eq!(view.photo_urls.len(), 2);
        assert_eq!(view.viewed, ViewedFlags::default());

        // Reading is not viewing.
        let record = gifts.fetch_by_token(&created.token).await.unwrap();
        assert!(!record.photos_viewed && !record.letter_viewed && !record.promise_viewed);
    }

    #[tokio::test]
    async fn test_fetch_gift_reports_current_flags() {
        let (lifecycle, _, _) = test_lifecycle();
        let created = lifecycle
            .create_gift(create_test_request(1))
            .await
            .unwrap();

        lifecycle
            .view_section(&created.token, Section::Letter)
            .await
            .unwrap();

        let view = lifecycle.fetch_gift(&created.token).await.unwrap();
        assert_eq!(view.letter_text.as_deref(), Some("I adore you"));
        assert!(view.viewed.letter);
        assert!(!view.viewed.photos && !view.viewed.promise);
    }

    #[tokio::test]
    async fn test_worked_example() {
        let (lifecycle, gifts, _) = test_lifecycle();
        let created = lifecycle
            .create_gift(create_test_request(2))
            .await
            .unwrap();
        let token = created.token;

        let view = lifecycle.view_section(&token, Section::Photos).await.unwrap();
        match &view.content {
            SectionContent::Photos { urls } => assert_eq!(urls.len(), 2),
            other => panic!("expected photos, got {other:?}"),
        }
        assert_eq!(
            view.viewed,
            ViewedFlags {
                photos: true,
                letter: false,
                promise: false
            }
        );

        let view = lifecycle.view_section(&token, Section::Letter).await.unwrap();
        assert_eq!(
            view.content,
            SectionContent::Letter {
                text: "I adore you".to_string()
            }
        );
        assert_eq!(
            view.viewed,
            ViewedFlags {
                photos: true,
                letter: true,
                promise: false
            }
        );

        let view = lifecycle.view_section(&token, Section::Promise).await.unwrap();
        assert_eq!(
            view.content,
            SectionContent::Promise {
                text: "Always".to_string()
            }
        );
        assert!(view.viewed.all_viewed());

        let err = lifecycle
            .view_section(&token, Section::Photos)
            .await
            .unwrap_err();
        assert!(matches!(err, GiftError::NotFoundOrExpired));
        assert_eq!(gifts.record_count(), 0);
    }

    #[tokio::test]
    async fn test_names_and_texts_are_trimmed() {
        let (lifecycle, gifts, _) = test_lifecycle();
        let mut request = create_test_request(1);
        request.creator_name = "  Sam  ".to_string();
        request.letter_text = " I adore you \n".to_string();

        let created = lifecycle.create_gift(request).await.unwrap();
        let record = gifts.fetch_by_token(&created.token).await.unwrap();
        assert_eq!(record.creator_name, "Sam");
        assert_eq!(record.letter_text.as_deref(), Some("I adore you"));
    }
}
