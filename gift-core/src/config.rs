/// Configuration for gift creation and share links
#[derive(Debug, Clone)]
pub struct GiftConfig {
    /// Fewest photos a gift may carry
    pub min_photos: usize,

    /// Most photos a gift may carry; counts above this are rejected, not
    /// truncated
    pub max_photos: usize,

    /// Absolute max size allowed for a single photo (safety guard)
    pub max_photo_bytes: u64,

    /// Origin the share link is built from: `{public_base_url}/gift/{token}`
    pub public_base_url: String,
}

impl Default for GiftConfig {
    fn default() -> Self {
        Self {
            min_photos: 1,
            max_photos: 5,
            max_photo_bytes: 10 * 1024 * 1024, // 10MB
            public_base_url: "http://127.0.0.1:3030".to_string(),
        }
    }
}

impl GiftConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allowed photo count range
    pub fn with_photo_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_photos = min;
        self.max_photos = max;
        self
    }

    /// Set max photo size
    pub fn with_max_photo_bytes(mut self, bytes: u64) -> Self {
        self.max_photo_bytes = bytes;
        self
    }

    /// Set the origin share links are built from
    pub fn with_public_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.public_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Share link for a token, the shape viewers paste into a browser.
    pub fn share_url(&self, token: &crate::GiftToken) -> String {
        format!("{}/gift/{}", self.public_base_url.trim_end_matches('/'), token)
    }
}
