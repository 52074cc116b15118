//! gift-axum: HTTP surface for the single-view gift service.
//!
//! Wires [`gift_core::GiftLifecycle`] behind an Axum router: multipart
//! creation, whole-gift reads, and the section views that eventually
//! purge the gift.

mod app;
mod config;
mod error;
mod rest;
mod state;

use gift_blob::FsPhotoStore;
use gift_core::{GiftLifecycle, MemoryGiftStore};

pub use app::GiftApp;
pub use config::{gift_config, http_config, HttpConfig};
pub use error::GiftAxumError;
pub use state::GiftAxumState;

/// Builds the default deployment: in-memory gift records, photos on local
/// disk under `PHOTO_DIR`, served back at `{PUBLIC_BASE_URL}/photos`.
pub fn build() -> anyhow::Result<GiftApp> {
    let config = gift_config();
    let photo_dir = std::env::var("PHOTO_DIR").unwrap_or_else(|_| "./gift-photos".to_string());
    std::fs::create_dir_all(&photo_dir)?;

    let photo_base = format!("{}/photos", config.public_base_url);
    let photos = FsPhotoStore::new(&photo_dir, photo_base);
    let lifecycle = GiftLifecycle::new(MemoryGiftStore::new(), photos, config);

    Ok(GiftApp::new(lifecycle).serve_photos(photo_dir))
}

/// Builds the router around an existing lifecycle, for tests and for
/// deployments that wire their own stores.
pub fn build_with(lifecycle: GiftLifecycle) -> GiftApp {
    GiftApp::new(lifecycle)
}
