use serde::Deserialize;
use std::env;

// Top-level configuration container for the engine
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
}

// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub rust_log: String,
}

// Backend API settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Durable local cart storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the cart payload files; unset disables persistence.
    pub cart_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Config {
            app: AppConfig {
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "venue_planner=debug".to_string()),
            },
            backend: BackendConfig {
                base_url: env::var("BACKEND_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
                timeout_seconds: env::var("BACKEND_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("BACKEND_TIMEOUT_SECONDS must be a valid number"),
            },
            storage: StorageConfig {
                cart_dir: env::var("CART_STORAGE_DIR").ok().filter(|v| !v.is_empty()),
            },
        }
    }
}
