//! # gift-blob: Photo storage for single-view gifts
//!
//! `gift-blob` stores the photos attached to a gift under one namespace per
//! gift, and knows how to tear that namespace down again when the gift is
//! consumed. It is deliberately small: gifts carry a handful of images, not
//! streaming media, so everything moves as in-memory [`bytes::Bytes`].
//!
//! ## Key Features
//!
//! - **Namespace per gift**: every photo lives under its gift's id, so purging
//!   a gift is one `remove_all` call
//! - **Idempotent teardown**: removing photos that are already gone succeeds,
//!   which lets callers retry a failed purge safely
//! - **Deterministic URLs**: `public_url` is pure, so viewers can be handed
//!   links without touching the backend
//! - **Storage agnostic**: in-memory and filesystem backends ship here; any
//!   other backend just implements [`PhotoStore`]
//!
//! ## Quick Start
//!
//! ```rust
//! use gift_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> PhotoResult<()> {
//! let store = MemoryPhotoStore::new();
//!
//! // Upload order is preserved through the index prefix.
//! let name = photo_name(0, "beach.jpg");
//! store
//!     .put("gift-1", &name, Some("image/jpeg"), bytes::Bytes::from_static(b"..."))
//!     .await?;
//!
//! let photos = store.list("gift-1").await?;
//! assert_eq!(photos[0].name, "0-beach.jpg");
//!
//! // After the gift is consumed, the namespace comes down in one call.
//! let names: Vec<String> = photos.into_iter().map(|p| p.name).collect();
//! store.remove_all("gift-1", &names).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod fs;
mod memory;
pub mod store;

// Re-export main types for clean API
pub use error::{PhotoError, PhotoResult};
pub use fs::FsPhotoStore;
pub use memory::MemoryPhotoStore;
pub use store::{photo_name, sanitize_filename, PhotoStore, StoredPhoto};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        photo_name, FsPhotoStore, MemoryPhotoStore, PhotoError, PhotoResult, PhotoStore,
        StoredPhoto,
    };
}
