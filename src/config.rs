use std::env;

/// Application configuration, loaded from environment variables with
/// sensible defaults. `.env` files are honored when present.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// bcrypt work factor for password hashing.
    pub bcrypt_cost: u32,
    /// Default log filter level when `RUST_LOG` is not set.
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            log_level: "info".to_string(),
        }
    }
}
