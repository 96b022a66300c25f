//! Buyer-side selection state.
//!
//! The cart holds the set of items the buyer intends to reserve or
//! purchase and keeps it de-duplicated: per show, at most one seated
//! entry per seat and at most one standing entry per sector. Every
//! mutation is written through to durable local storage so the cart
//! survives navigation; a second, independently-cleared slot holds the
//! ticket ids of an existing reservation being converted to a purchase.

pub mod storage;

use tracing::debug;

use crate::models::{PaymentItem, ReservedTicket};
use storage::CartStorage;

pub struct CartService {
    items: Vec<PaymentItem>,
    reserved_ticket_ids: Vec<i64>,
    store: CartStorage,
}

impl CartService {
    /// Restore whatever the store holds; corrupt payloads come back as
    /// empty collections (see `CartStorage`).
    pub fn new(store: CartStorage) -> Self {
        let items = store.load_items();
        let reserved_ticket_ids = store.load_reserved();
        debug!(
            "cart restored: {} items, {} reserved tickets",
            items.len(),
            reserved_ticket_ids.len()
        );
        Self { items, reserved_ticket_ids, store }
    }

    pub fn in_memory() -> Self {
        Self::new(CartStorage::disabled())
    }

    pub fn items(&self) -> &[PaymentItem] {
        &self.items
    }

    /// Add a selection. A seated item already in the cart is left alone
    /// (the add is a no-op); a standing item for an already-selected
    /// sector replaces the existing entry, which is how a quantity gets
    /// updated by re-adding.
    pub fn add(&mut self, item: PaymentItem) {
        match &item {
            PaymentItem::Seated { show_id, sector_id, seat_id, .. } => {
                let exists = self.items.iter().any(|existing| matches!(
                    existing,
                    PaymentItem::Seated { show_id: s, sector_id: sec, seat_id: seat, .. }
                        if s == show_id && sec == sector_id && seat == seat_id
                ));
                if exists {
                    return;
                }
                self.items.push(item);
            }
            PaymentItem::Standing { show_id, sector_id, .. } => {
                self.items.retain(|existing| !matches!(
                    existing,
                    PaymentItem::Standing { show_id: s, sector_id: sec, .. }
                        if s == show_id && sec == sector_id
                ));
                self.items.push(item);
            }
        }
        self.store.save_items(&self.items);
    }

    /// Drop every entry matching the item's unit: seat for seated items,
    /// sector for standing ones.
    pub fn remove(&mut self, item: &PaymentItem) {
        match item {
            PaymentItem::Seated { show_id, sector_id, seat_id, .. } => {
                self.items.retain(|existing| !matches!(
                    existing,
                    PaymentItem::Seated { show_id: s, sector_id: sec, seat_id: seat, .. }
                        if s == show_id && sec == sector_id && seat == seat_id
                ));
            }
            PaymentItem::Standing { show_id, sector_id, .. } => {
                self.items.retain(|existing| !matches!(
                    existing,
                    PaymentItem::Standing { show_id: s, sector_id: sec, .. }
                        if s == show_id && sec == sector_id
                ));
            }
        }
        self.store.save_items(&self.items);
    }

    pub fn total(&self) -> i64 {
        self.items.iter().map(PaymentItem::line_total).sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.store.clear_items();
    }

    // --- Reservation-conversion slot ---

    pub fn reserved_ticket_ids(&self) -> &[i64] {
        &self.reserved_ticket_ids
    }

    pub fn set_reserved_tickets(&mut self, ids: Vec<i64>) {
        self.reserved_ticket_ids = ids;
        self.store.save_reserved(&self.reserved_ticket_ids);
    }

    /// Cleared separately from the item list on successful checkout.
    pub fn clear_reserved_tickets(&mut self) {
        self.reserved_ticket_ids.clear();
        self.store.clear_reserved();
    }
}

/// Translate an existing reservation's tickets into selectable cart
/// items: a ticket with a seat becomes a seated item, one without
/// becomes a standing item with quantity fixed at 1 (each reserved
/// standing ticket is a discrete unit).
pub fn items_from_reservation(tickets: &[ReservedTicket]) -> Vec<PaymentItem> {
    tickets
        .iter()
        .map(|ticket| match ticket.seat_id {
            Some(seat_id) => PaymentItem::Seated {
                show_id: ticket.show_id,
                sector_id: ticket.sector_id,
                seat_id,
                price: ticket.price,
                row: ticket.row.unwrap_or(0),
                column: ticket.column.unwrap_or(0),
            },
            None => PaymentItem::Standing {
                show_id: ticket.show_id,
                sector_id: ticket.sector_id,
                price: ticket.price,
                quantity: 1,
            },
        })
        .collect()
}
