use std::sync::Arc;

use gift_core::GiftLifecycle;

pub struct GiftAxumState {
    pub lifecycle: Arc<GiftLifecycle>,
}

impl Clone for GiftAxumState {
    fn clone(&self) -> Self {
        Self {
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl GiftAxumState {
    pub fn new(lifecycle: GiftLifecycle) -> Self {
        Self {
            lifecycle: Arc::new(lifecycle),
        }
    }
}
