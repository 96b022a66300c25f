pub mod cart;
pub mod config;
pub mod editor;
pub mod error;
pub mod layout;
pub mod models;
pub mod sync;

pub use error::EngineError;

// Shared state for one client instance
pub struct EngineState {
    pub config: config::Config,
    pub api: sync::ApiClient,
    pub cart: cart::CartService,
}

impl EngineState {
    pub fn new(config: config::Config) -> Self {
        let api = sync::ApiClient::from_config(&config.backend);
        let store = cart::storage::CartStorage::from_config(&config.storage);
        let cart = cart::CartService::new(store);
        tracing::info!("engine initialized against {}", config.backend.base_url);
        Self { config, api, cart }
    }

    /// Fetch a room and open a save session for it. The session's
    /// generation counter starts fresh with this load.
    pub async fn open_room(&self, room_id: i64) -> Result<sync::RoomSession, EngineError> {
        let room = self.api.fetch_room(room_id).await?;
        Ok(sync::RoomSession::new(room))
    }
}
