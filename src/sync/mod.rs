//! Backend sync protocol.
//!
//! Two disciplines live here. Room saves are optimistic-on-submit,
//! authoritative-on-response: the whole in-memory room is sent as one
//! replace and the canonical response unconditionally overwrites local
//! state, with no merge or partial acceptance. `RoomSession` carries a
//! generation counter per room load so a stale in-flight response can be
//! detected and discarded, and refuses a second save while one is in
//! flight. Cart submission is a show-scoped purchase/reservation request;
//! a success is the only point the engine assumes server-side capacity
//! was honored, and it clears both cart slots. Nothing here retries:
//! every backend error is terminal for the triggering action.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cart::CartService;
use crate::config::BackendConfig;
use crate::error::EngineError;
use crate::models::{PaymentItem, Room};

/// One per-unit target of a fresh purchase/reservation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PurchaseTarget {
    #[serde(rename = "seated", rename_all = "camelCase")]
    Seated { seat_id: i64, sector_id: i64 },
    #[serde(rename = "standing", rename_all = "camelCase")]
    Standing { sector_id: i64, quantity: u32 },
}

impl PurchaseTarget {
    pub fn from_item(item: &PaymentItem) -> Self {
        match item {
            PaymentItem::Seated { seat_id, sector_id, .. } => {
                PurchaseTarget::Seated { seat_id: *seat_id, sector_id: *sector_id }
            }
            PaymentItem::Standing { sector_id, quantity, .. } => {
                PurchaseTarget::Standing { sector_id: *sector_id, quantity: *quantity }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub card_number: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

/// Checkout payload: either fresh per-unit targets, or — when converting
/// an existing reservation — only the previously-reserved ticket ids.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CheckoutRequest {
    New {
        #[serde(rename = "showId")]
        show_id: i64,
        targets: Vec<PurchaseTarget>,
        #[serde(flatten)]
        payment: PaymentDetails,
    },
    FromReservation {
        #[serde(rename = "reservedTicketIds")]
        reserved_ticket_ids: Vec<i64>,
        #[serde(flatten)]
        payment: PaymentDetails,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: i64,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { http, base_url: base_url.into() }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, std::time::Duration::from_secs(config.timeout_seconds))
    }

    pub async fn fetch_room(&self, room_id: i64) -> Result<Room, EngineError> {
        let url = format!("{}/rooms/{}", self.base_url, room_id);
        self.expect_json(self.http.get(url)).await
    }

    /// Full-room replace. A room without an id has never been persisted
    /// and is created instead; either way the response is the canonical
    /// room that becomes the new local truth.
    pub async fn save_room(&self, room: &Room) -> Result<Room, EngineError> {
        let builder = match room.id {
            Some(id) => self.http.put(format!("{}/rooms/{}", self.base_url, id)),
            None => self.http.post(format!("{}/rooms", self.base_url)),
        };
        self.expect_json(builder.json(room)).await
    }

    pub async fn submit_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<OrderConfirmation, EngineError> {
        let url = format!("{}/orders", self.base_url);
        self.expect_json(self.http.post(url).json(request)).await
    }

    async fn expect_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, EngineError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Backend {
                status: status.as_u16(),
                message: extract_message(&body, status),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

// Best-effort error message extraction: structured {"message": ...}
// first, plain body text next, HTTP reason as a last resort.
fn extract_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status.canonical_reason().unwrap_or("request failed").to_string()
}

/// Opaque handle for one in-flight save, bound to the generation it was
/// issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveToken(u64);

/// One loaded room plus its generation counter. The generation bumps on
/// every accepted save and every reload, so responses that raced a
/// newer load are recognized as stale and dropped instead of clobbering
/// state that is no longer displayed.
#[derive(Debug)]
pub struct RoomSession {
    room: Room,
    generation: u64,
    in_flight: Option<u64>,
}

impl RoomSession {
    pub fn new(mut room: Room) -> Self {
        room.normalize();
        Self { room, generation: 0, in_flight: None }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn room_mut(&mut self) -> &mut Room {
        &mut self.room
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a save. Refused while another save for this room is in
    /// flight, since the full-replace response would clobber edits made
    /// in the meantime.
    pub fn begin_save(&mut self) -> Result<SaveToken, EngineError> {
        if self.in_flight.is_some() {
            return Err(EngineError::SaveInFlight);
        }
        self.in_flight = Some(self.generation);
        Ok(SaveToken(self.generation))
    }

    /// A save failed in transport; local state stays as-is.
    pub fn abort_save(&mut self, token: SaveToken) {
        if self.in_flight == Some(token.0) {
            self.in_flight = None;
        }
    }

    /// Apply a save response. Returns false (and drops the response)
    /// when the token is stale, i.e. the room was reloaded while the
    /// request was in flight.
    pub fn accept(&mut self, token: SaveToken, mut canonical: Room) -> bool {
        if self.in_flight == Some(token.0) {
            self.in_flight = None;
        }
        if token.0 != self.generation {
            warn!(
                "discarding stale save response (token {}, generation {})",
                token.0, self.generation
            );
            return false;
        }
        canonical.normalize();
        self.room = canonical;
        self.generation += 1;
        debug!("room save accepted, generation now {}", self.generation);
        true
    }

    /// Replace local state from a fresh fetch; any in-flight save
    /// response becomes stale.
    pub fn reload(&mut self, mut room: Room) {
        room.normalize();
        self.room = room;
        self.generation += 1;
        self.in_flight = None;
    }
}

/// Save the session's room and fold the canonical response back in.
/// Derived layout caches must be rebuilt by the caller afterwards.
pub async fn save_room(session: &mut RoomSession, api: &ApiClient) -> Result<(), EngineError> {
    let token = session.begin_save()?;
    match api.save_room(session.room()).await {
        Ok(canonical) => {
            session.accept(token, canonical);
            Ok(())
        }
        Err(e) => {
            session.abort_save(token);
            Err(e)
        }
    }
}

/// Submit the buyer's cart for one show. A reservation being converted
/// takes precedence: only its ticket ids are sent. On success both cart
/// slots are cleared — the single point where server-side capacity is
/// assumed to have been honored.
pub async fn submit_cart(
    api: &ApiClient,
    cart: &mut CartService,
    show_id: i64,
    payment: PaymentDetails,
) -> Result<OrderConfirmation, EngineError> {
    let request = if cart.reserved_ticket_ids().is_empty() {
        CheckoutRequest::New {
            show_id,
            targets: cart
                .items()
                .iter()
                .filter(|item| item.show_id() == show_id)
                .map(PurchaseTarget::from_item)
                .collect(),
            payment,
        }
    } else {
        CheckoutRequest::FromReservation {
            reserved_ticket_ids: cart.reserved_ticket_ids().to_vec(),
            payment,
        }
    };
    let confirmation = api.submit_checkout(&request).await?;
    info!("checkout accepted, order {}", confirmation.order_id);
    cart.clear();
    cart.clear_reserved_tickets();
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: Option<i64>, name: &str) -> Room {
        let mut r = Room::new(name, 3, 2);
        r.id = id;
        r
    }

    #[test]
    fn second_save_is_refused_while_one_is_in_flight() {
        let mut session = RoomSession::new(room(Some(1), "A"));
        let _token = session.begin_save().unwrap();
        assert!(matches!(session.begin_save(), Err(EngineError::SaveInFlight)));
    }

    #[test]
    fn accepted_save_replaces_room_and_bumps_generation() {
        let mut session = RoomSession::new(room(Some(1), "A"));
        let token = session.begin_save().unwrap();
        assert!(session.accept(token, room(Some(1), "canonical")));
        assert_eq!(session.room().name, "canonical");
        assert_eq!(session.generation(), 1);
        // Guard released.
        session.begin_save().unwrap();
    }

    #[test]
    fn flat_only_canonical_room_is_normalized_on_accept() {
        use crate::models::{Seat, Sector, SectorKind};

        let mut canonical = room(Some(1), "canonical");
        canonical.sectors.push(Sector {
            id: Some(10),
            kind: SectorKind::Seated,
            name: None,
            price: Some(10),
            capacity: None,
            seats: Vec::new(),
        });
        canonical.seats.push(Seat {
            id: Some(5),
            row_number: 1,
            column_number: 1,
            deleted: false,
            sector_id: Some(10),
            room_id: Some(1),
        });

        let mut session = RoomSession::new(room(Some(1), "A"));
        let token = session.begin_save().unwrap();
        assert!(session.accept(token, canonical));
        assert_eq!(session.room().sectors[0].seats.len(), 1);
        assert_eq!(session.room().sectors[0].max_column(), 1);
    }

    #[test]
    fn response_racing_a_reload_is_discarded() {
        let mut session = RoomSession::new(room(Some(1), "A"));
        let token = session.begin_save().unwrap();
        session.reload(room(Some(1), "refetched"));
        assert!(!session.accept(token, room(Some(1), "stale")));
        assert_eq!(session.room().name, "refetched");
    }

    #[test]
    fn aborted_save_keeps_local_state_and_releases_guard() {
        let mut session = RoomSession::new(room(Some(1), "edited"));
        let token = session.begin_save().unwrap();
        session.abort_save(token);
        assert_eq!(session.room().name, "edited");
        session.begin_save().unwrap();
    }

    #[test]
    fn purchase_targets_serialize_with_discriminated_shape() {
        let seated = PurchaseTarget::Seated { seat_id: 5, sector_id: 10 };
        let standing = PurchaseTarget::Standing { sector_id: 20, quantity: 3 };
        assert_eq!(
            serde_json::to_value(&seated).unwrap(),
            serde_json::json!({"type": "seated", "seatId": 5, "sectorId": 10})
        );
        assert_eq!(
            serde_json::to_value(&standing).unwrap(),
            serde_json::json!({"type": "standing", "sectorId": 20, "quantity": 3})
        );
    }

    #[test]
    fn reservation_checkout_carries_only_ticket_ids() {
        let payment = PaymentDetails {
            email: "a@b.c".into(),
            address: "Main St 1".into(),
            city: "Vienna".into(),
            zip_code: "1010".into(),
            card_number: "4111111111111111".into(),
            card_expiry: "12/30".into(),
            card_cvc: "123".into(),
        };
        let request = CheckoutRequest::FromReservation {
            reserved_ticket_ids: vec![7, 8],
            payment,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["reservedTicketIds"], serde_json::json!([7, 8]));
        assert!(value.get("targets").is_none());
        assert_eq!(value["cardNumber"], "4111111111111111");
    }
}
