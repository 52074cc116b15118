//! Library template created with FerrisUp

//! gift-core: domain model and single-view lifecycle for self-destructing
//! gifts.
//!
//! A gift bundles photos, a letter and a promise behind one unguessable
//! token. Each section can be opened independently; once all three have
//! been opened the gift purges itself (photos first, then the record)
//! and the token behaves as if it never existed. [`GiftLifecycle`] owns
//! that protocol over two collaborator contracts: [`GiftStore`] for the
//! record and `gift_blob::PhotoStore` for the photos.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod store;
pub mod types;

pub use config::GiftConfig;
pub use error::{GiftError, GiftResult};
pub use lifecycle::GiftLifecycle;
pub use memory::MemoryGiftStore;
pub use store::GiftStore;
pub use types::{
    CreateGift, Gift, GiftCreated, GiftId, GiftToken, GiftView, NewGift, PhotoUpload, Section,
    SectionContent, SectionView, ViewedFlags,
};
