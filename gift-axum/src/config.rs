use std::env;

use gift_core::GiftConfig;

/// HTTP server settings, resolved from environment variables with
/// development defaults.
pub struct HttpConfig {
    pub host: String,
    pub port: String,
}

impl HttpConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn http_config() -> HttpConfig {
    let host = env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("HTTP_PORT").unwrap_or_else(|_| "3030".to_string());
    HttpConfig { host, port }
}

/// Gift rules from the environment, on top of the library defaults.
///
/// `PUBLIC_BASE_URL` is the address share links and photo links point at,
/// so it has to be whatever the recipient can actually reach.
pub fn gift_config() -> GiftConfig {
    let base_url =
        env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3030".to_string());
    let min_photos = env_var_or("GIFT_MIN_PHOTOS", 1usize);
    let max_photos = env_var_or("GIFT_MAX_PHOTOS", 5usize);
    let max_photo_mb = env_var_or("GIFT_MAX_PHOTO_SIZE_MB", 10u64);

    GiftConfig::new()
        .with_public_base_url(base_url)
        .with_photo_bounds(min_photos, max_photos)
        .with_max_photo_bytes(max_photo_mb * 1024 * 1024)
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Debug,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}
