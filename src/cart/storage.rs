use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::config::StorageConfig;
use crate::models::PaymentItem;

const ITEMS_FILE: &str = "cart-items.json";
const RESERVED_FILE: &str = "reserved-tickets.json";

/// Durable local store for the buyer's cart, one JSON payload per slot.
/// Best-effort: write failures are logged and swallowed, and a corrupt
/// payload is discarded as an empty cart rather than surfaced as an
/// error. With no directory configured everything stays in memory.
#[derive(Debug, Clone)]
pub struct CartStorage {
    dir: Option<PathBuf>,
}

impl CartStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()) }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        match &config.cart_dir {
            Some(dir) => Self::new(dir),
            None => Self::disabled(),
        }
    }

    pub fn load_items(&self) -> Vec<PaymentItem> {
        self.load_json(ITEMS_FILE)
    }

    pub fn save_items(&self, items: &[PaymentItem]) {
        self.save_json(ITEMS_FILE, items);
    }

    pub fn clear_items(&self) {
        self.remove(ITEMS_FILE);
    }

    pub fn load_reserved(&self) -> Vec<i64> {
        self.load_json(RESERVED_FILE)
    }

    pub fn save_reserved(&self, ids: &[i64]) {
        self.save_json(RESERVED_FILE, ids);
    }

    pub fn clear_reserved(&self) {
        self.remove(RESERVED_FILE);
    }

    fn load_json<T: serde::de::DeserializeOwned + Default>(&self, file: &str) -> T {
        let Some(path) = self.path(file) else {
            return T::default();
        };
        let Ok(data) = fs::read_to_string(&path) else {
            return T::default();
        };
        match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(e) => {
                // Corrupt payload: treat as empty, never propagate.
                warn!("discarding corrupt cart payload {:?}: {}", path, e);
                T::default()
            }
        }
    }

    fn save_json<T: serde::Serialize + ?Sized>(&self, file: &str, value: &T) {
        let Some(path) = self.path(file) else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string(value) {
            Ok(data) => {
                if let Err(e) = fs::write(&path, data) {
                    warn!("failed to persist cart payload {:?}: {}", path, e);
                }
            }
            Err(e) => warn!("failed to serialize cart payload: {}", e),
        }
    }

    fn remove(&self, file: &str) {
        if let Some(path) = self.path(file) {
            let _ = fs::remove_file(path);
        }
    }

    fn path(&self, file: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(file))
    }
}
